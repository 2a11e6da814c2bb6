use std::fmt::Write;

use super::Order;

/// Renders a printable HTML invoice for `order`.
///
/// The layout is cosmetic. Every line item, the delivery price and the total
/// are always present.
pub fn render_invoice(order: &Order, shop_name: &str) -> String {
    let mut rows = String::new();
    for item in &order.items {
        let _ = write!(
            rows,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(&item.product_name),
            item.quantity,
            item.price,
            item.line_total()
        );
    }

    format!(
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>Invoice {id}</title></head><body>\
         <h1>{shop}</h1>\
         <p>Invoice {id} &middot; {date}</p>\
         <p>{customer}<br>{phone}<br>{address}, {wilaya}</p>\
         <table><thead><tr><th>Product</th><th>Qty</th><th>Unit price</th><th>Amount</th></tr></thead>\
         <tbody>{rows}</tbody></table>\
         <p>Subtotal: {subtotal}</p><p>Delivery: {delivery}</p><p><strong>Total: {total}</strong></p>\
         <p>Payment on delivery.</p></body></html>\n",
        id = escape(&order.id),
        shop = escape(shop_name),
        date = order.created_at.format("%Y-%m-%d"),
        customer = escape(&order.customer_name),
        phone = escape(order.phone.as_str()),
        address = escape(&order.address),
        wilaya = escape(&order.wilaya),
        subtotal = order.subtotal(),
        delivery = order.delivery_price,
        total = order.total_amount,
    )
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{OrderItem, OrderStatus, PhoneNumber};
    use chrono::Utc;
    use rust_decimal_macros::dec;

    #[test]
    fn test_invoice_lists_every_line_and_total() {
        let order = Order {
            id: "order_7".into(),
            customer_id: "customer_1".into(),
            customer_name: "Sami <Boss>".into(),
            phone: PhoneNumber::parse("0550111222", "213").unwrap(),
            address: "5 Rue Larbi Ben M'hidi".into(),
            wilaya: "Algiers".into(),
            items: vec![
                OrderItem { product_id: "p1".into(), product_name: "Wok".into(), price: dec!(3200), quantity: 1 },
                OrderItem { product_id: "p2".into(), product_name: "Knife & block".into(), price: dec!(1500), quantity: 2 },
            ],
            delivery_price: dec!(400),
            total_amount: dec!(6600),
            status: OrderStatus::Pending,
            rejection_reason: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let html = render_invoice(&order, "Kitchen Corner");
        assert!(html.contains("<td>Wok</td><td>1</td><td>3200</td><td>3200</td>"));
        assert!(html.contains("<td>Knife &amp; block</td><td>2</td><td>1500</td><td>3000</td>"));
        assert!(html.contains("Delivery: 400"));
        assert!(html.contains("Total: 6600"));
        assert!(html.contains("Sami &lt;Boss&gt;"));
        assert!(html.contains("+213550111222"));
    }
}
