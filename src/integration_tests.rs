mod mocked {
    use chrono::Utc;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use crate::actor_framework::{FrameworkError, Upserted};
    use crate::clients::{CustomerClient, OrderClient, ProductClient, ShippingClient};
    use crate::customer_actor::CustomerAction;
    use crate::domain::{
        CartLine, CheckoutRequest, Customer, DeliveryOutcome, Order, OrderEvent, OrderItem, OrderStatus, PhoneNumber,
        Product, ReliabilityPolicy, ShippingRate,
    };
    use crate::mock_framework::{create_mock_client, expect_action, expect_create, expect_get, expect_list, expect_upsert};
    use crate::order_actor::{OrderAction, OrderError};

    struct Mocks {
        customers: tokio::sync::mpsc::Receiver<crate::actor_framework::ResourceRequest<Customer>>,
        products: tokio::sync::mpsc::Receiver<crate::actor_framework::ResourceRequest<Product>>,
        rates: tokio::sync::mpsc::Receiver<crate::actor_framework::ResourceRequest<ShippingRate>>,
        orders: tokio::sync::mpsc::Receiver<crate::actor_framework::ResourceRequest<Order>>,
    }

    fn setup() -> (OrderClient, Mocks) {
        let (customer_inner, customers) = create_mock_client::<Customer>(10);
        let (product_inner, products) = create_mock_client::<Product>(10);
        let (shipping_inner, rates) = create_mock_client::<ShippingRate>(10);
        let (order_inner, orders) = create_mock_client::<Order>(10);

        let order_client = OrderClient::new(
            order_inner,
            CustomerClient::new(customer_inner, "213", ReliabilityPolicy::default()),
            ProductClient::new(product_inner),
            ShippingClient::new(shipping_inner, dec!(500)),
        );
        (order_client, Mocks { customers, products, rates, orders })
    }

    fn checkout(items: Vec<CartLine>) -> CheckoutRequest {
        CheckoutRequest {
            customer_name: "Karim".into(),
            phone: "0550 111 222".into(),
            address: "7 Boulevard Zighout Youcef".into(),
            wilaya: "Algiers".into(),
            items,
        }
    }

    fn cooker(price: Decimal) -> Product {
        Product {
            id: "product_1".into(),
            name: "Pressure cooker".into(),
            old_price: dec!(3000),
            new_price: price,
            image_url: String::new(),
            is_featured: false,
            created_at: Utc::now(),
        }
    }

    fn rate(id: &str, name: &str, price: Decimal) -> ShippingRate {
        ShippingRate { id: id.into(), name: name.into(), price, active: true }
    }

    fn karim() -> Customer {
        Customer {
            id: "customer_4".into(),
            phone: PhoneNumber::parse("0550111222", "213").unwrap(),
            name: "Karim".into(),
            address: "7 Boulevard Zighout Youcef".into(),
            total_orders: 0,
            delivered_orders: 0,
            warnings: 0,
            is_reliable: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// Plays the catalog, rate table and registry up to the order write.
    async fn answer_until_order_write(mocks: &mut Mocks) -> crate::actor_framework::Response<String> {
        let (product_id, responder) = expect_get(&mut mocks.products).await.expect("Expected Product Get");
        assert_eq!(product_id, "product_1");
        responder.send(Ok(Some(cooker(dec!(2500))))).unwrap();

        let (filter, responder) = expect_list(&mut mocks.rates).await.expect("Expected rate lookup");
        let filter = filter.expect("rate lookup must filter rows");
        let rows: Vec<_> = vec![rate("wilaya_1", "Algiers", dec!(400)), rate("wilaya_2", "Oran", dec!(600))]
            .into_iter()
            .filter(|r| filter(r))
            .collect();
        assert_eq!(rows.len(), 1);
        responder.send(Ok(rows)).unwrap();

        let (payload, responder) = expect_upsert(&mut mocks.customers).await.expect("Expected Customer Upsert");
        assert_eq!(payload.phone.as_str(), "+213550111222");
        assert_eq!(payload.name, "Karim");
        responder.send(Ok(Upserted::Matched("customer_4".into()))).unwrap();

        let (payload, responder) = expect_create(&mut mocks.orders).await.expect("Expected Order Create");
        assert_eq!(payload.customer_id, "customer_4");
        assert_eq!(payload.delivery_price, dec!(400));
        assert_eq!(payload.items.len(), 1);
        assert_eq!(payload.items[0].product_name, "Pressure cooker");
        assert_eq!(payload.items[0].price, dec!(2500));
        assert_eq!(payload.items[0].quantity, 2);
        responder
    }

    #[tokio::test]
    async fn test_order_creation_flow() {
        let (order_client, mut mocks) = setup();
        let order_task = tokio::spawn(async move {
            order_client.create_order(checkout(vec![CartLine::new("product_1", 2)])).await
        });

        let responder = answer_until_order_write(&mut mocks).await;
        responder.send(Ok("order_1".to_string())).unwrap();

        let result = order_task.await.unwrap();
        assert_eq!(result, Ok("order_1".to_string()));
    }

    #[tokio::test]
    async fn test_failed_order_write_retracts_customer_count() {
        let (order_client, mut mocks) = setup();
        let order_task = tokio::spawn(async move {
            order_client.create_order(checkout(vec![CartLine::new("product_1", 2)])).await
        });

        let responder = answer_until_order_write(&mut mocks).await;
        responder.send(Err(FrameworkError::ActorDropped)).unwrap();

        let (customer_id, action, responder) =
            expect_action(&mut mocks.customers).await.expect("Expected compensation");
        assert_eq!(customer_id, "customer_4");
        assert!(matches!(action, CustomerAction::RetractOrder));
        responder.send(Ok(karim())).unwrap();

        let result = order_task.await.unwrap();
        assert_eq!(result, Err(OrderError::BackendError("Actor dropped".into())));
    }

    #[tokio::test]
    async fn test_invalid_checkout_sends_nothing() {
        let (order_client, mut mocks) = setup();

        let err = order_client.create_order(checkout(vec![])).await.unwrap_err();
        assert!(matches!(err, OrderError::ValidationError(_)));

        let mut blank_phone = checkout(vec![CartLine::new("product_1", 1)]);
        blank_phone.phone = "  ".into();
        assert!(matches!(order_client.create_order(blank_phone).await, Err(OrderError::ValidationError(_))));

        let zero = checkout(vec![CartLine::new("product_1", 0)]);
        assert!(matches!(order_client.create_order(zero).await, Err(OrderError::ValidationError(_))));

        assert!(mocks.products.try_recv().is_err());
        assert!(mocks.rates.try_recv().is_err());
        assert!(mocks.customers.try_recv().is_err());
        assert!(mocks.orders.try_recv().is_err());
    }

    fn order_in(status: OrderStatus) -> Order {
        Order {
            id: "order_9".into(),
            customer_id: "customer_4".into(),
            customer_name: "Karim".into(),
            phone: PhoneNumber::parse("0550111222", "213").unwrap(),
            address: "7 Boulevard Zighout Youcef".into(),
            wilaya: "Algiers".into(),
            items: vec![OrderItem {
                product_id: "product_1".into(),
                product_name: "Pressure cooker".into(),
                price: dec!(2500),
                quantity: 1,
            }],
            delivery_price: dec!(400),
            total_amount: dec!(2900),
            status,
            rejection_reason: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_customer_lookup_failure_leaves_order_shipped() {
        let (order_client, mut mocks) = setup();
        let task = tokio::spawn(async move { order_client.confirm_delivery("order_9".into()).await });

        let (id, responder) = expect_get(&mut mocks.orders).await.expect("Expected Order Get");
        assert_eq!(id, "order_9");
        responder.send(Ok(Some(order_in(OrderStatus::Shipped)))).unwrap();

        let (_, responder) = expect_list(&mut mocks.customers).await.expect("Expected customer lookup");
        responder.send(Err(FrameworkError::ActorDropped)).unwrap();

        let result = task.await.unwrap();
        assert_eq!(result, Err(OrderError::BackendError("Actor dropped".into())));
        assert!(mocks.orders.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_failed_ledger_update_restores_order_status() {
        let (order_client, mut mocks) = setup();
        let task = tokio::spawn(async move { order_client.confirm_delivery("order_9".into()).await });

        let (_, responder) = expect_get(&mut mocks.orders).await.expect("Expected Order Get");
        responder.send(Ok(Some(order_in(OrderStatus::Shipped)))).unwrap();

        let (filter, responder) = expect_list(&mut mocks.customers).await.expect("Expected customer lookup");
        let filter = filter.expect("lookup filters by phone");
        assert!(filter(&karim()));
        responder.send(Ok(vec![karim()])).unwrap();

        let (id, action, responder) = expect_action(&mut mocks.orders).await.expect("Expected order event");
        assert_eq!(id, "order_9");
        assert_eq!(action, OrderAction::Apply(OrderEvent::ConfirmDelivery));
        responder.send(Ok(order_in(OrderStatus::Delivered))).unwrap();

        let (customer_id, action, responder) =
            expect_action(&mut mocks.customers).await.expect("Expected ledger update");
        assert_eq!(customer_id, "customer_4");
        assert!(matches!(
            action,
            CustomerAction::ApplyOutcome { outcome: DeliveryOutcome::Delivered, .. }
        ));
        responder.send(Err(FrameworkError::ActorDropped)).unwrap();

        let (_, action, responder) = expect_action(&mut mocks.orders).await.expect("Expected order restore");
        assert_eq!(action, OrderAction::Restore { from: OrderStatus::Delivered, to: OrderStatus::Shipped });
        responder.send(Ok(order_in(OrderStatus::Shipped))).unwrap();

        let result = task.await.unwrap();
        assert_eq!(result, Err(OrderError::BackendError("Actor dropped".into())));
    }

    #[tokio::test]
    async fn test_not_delivered_ledger_failure_sends_no_restore() {
        let (order_client, mut mocks) = setup();
        let task = tokio::spawn(async move { order_client.report_not_delivered("order_9".into()).await });

        let (_, responder) = expect_get(&mut mocks.orders).await.expect("Expected Order Get");
        responder.send(Ok(Some(order_in(OrderStatus::Shipped)))).unwrap();
        let (_, responder) = expect_list(&mut mocks.customers).await.expect("Expected customer lookup");
        responder.send(Ok(vec![karim()])).unwrap();

        let (_, action, responder) = expect_action(&mut mocks.orders).await.expect("Expected order event");
        assert_eq!(action, OrderAction::Apply(OrderEvent::ReportNotDelivered));
        responder.send(Ok(order_in(OrderStatus::Shipped))).unwrap();

        let (_, _, responder) = expect_action(&mut mocks.customers).await.expect("Expected ledger update");
        responder.send(Err(FrameworkError::ActorClosed)).unwrap();

        let result = task.await.unwrap();
        assert_eq!(result, Err(OrderError::BackendError("Actor closed".into())));
        assert!(mocks.orders.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_illegal_delivery_is_refused_before_any_write() {
        let (order_client, mut mocks) = setup();
        let task = tokio::spawn(async move { order_client.confirm_delivery("order_9".into()).await });

        let (_, responder) = expect_get(&mut mocks.orders).await.expect("Expected Order Get");
        responder.send(Ok(Some(order_in(OrderStatus::Pending)))).unwrap();

        let result = task.await.unwrap();
        assert!(matches!(result, Err(OrderError::InvalidTransition(_))));
        assert!(mocks.customers.try_recv().is_err());
        assert!(mocks.orders.try_recv().is_err());
    }
}

mod end_to_end {
    use rust_decimal_macros::dec;

    use crate::app_system::{AdminError, AuthError, Config, LedgerSystem};
    use crate::domain::{CartLine, CheckoutRequest, OrderStatus, ProductCreate, ProductPatch};
    use crate::order_actor::OrderError;

    const PASSWORD: &str = "open-sesame";

    struct Shop {
        system: LedgerSystem,
        cooker: String,
        tray: String,
    }

    async fn shop() -> Shop {
        let hash = bcrypt::hash(PASSWORD, 4).unwrap();
        let config = Config { admin_password_hash: Some(hash), ..Config::default() };
        let system = LedgerSystem::new(&config);
        system.shipping_client.upsert_region("Algiers", dec!(400)).await.unwrap();
        system.shipping_client.upsert_region("Oran", dec!(600)).await.unwrap();

        let cooker = system
            .product_client
            .create_product(ProductCreate {
                name: "Pressure cooker".into(),
                old_price: dec!(3000),
                new_price: dec!(2500),
                image_url: String::new(),
            })
            .await
            .unwrap();
        let tray = system
            .product_client
            .create_product(ProductCreate {
                name: "Baking tray".into(),
                old_price: dec!(900),
                new_price: dec!(750),
                image_url: String::new(),
            })
            .await
            .unwrap();
        Shop { system, cooker, tray }
    }

    fn checkout(phone: &str, wilaya: &str, items: Vec<CartLine>) -> CheckoutRequest {
        CheckoutRequest {
            customer_name: "Nadia".into(),
            phone: phone.into(),
            address: "22 Rue Ben Boulaid".into(),
            wilaya: wilaya.into(),
            items,
        }
    }

    impl Shop {
        async fn place(&self, phone: &str) -> String {
            self.system
                .storefront
                .place_order(checkout(phone, "Algiers", vec![CartLine::new(self.cooker.clone(), 1)]))
                .await
                .unwrap()
        }

        async fn ship(&self, id: &str) {
            self.system.order_client.accept(id.to_string()).await.unwrap();
            self.system.order_client.ship(id.to_string()).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_total_is_snapshotted_at_creation() {
        let shop = shop().await;
        let items = vec![CartLine::new(shop.cooker.clone(), 2), CartLine::new(shop.tray.clone(), 3)];
        let id = shop.system.storefront.place_order(checkout("0550111222", "Algiers", items)).await.unwrap();

        let order = shop.system.order_client.get_order(id.clone()).await.unwrap().unwrap();
        assert_eq!(order.total_amount, dec!(2500) * dec!(2) + dec!(750) * dec!(3) + dec!(400));
        assert_eq!(order.status, OrderStatus::Pending);

        shop.system
            .product_client
            .update_product(shop.cooker.clone(), ProductPatch { new_price: Some(dec!(1)), ..Default::default() })
            .await
            .unwrap();
        shop.system.shipping_client.set_rate("Algiers", dec!(9999)).await.unwrap();

        let reread = shop.system.order_client.get_order(id).await.unwrap().unwrap();
        assert_eq!(reread.total_amount, order.total_amount);
        assert_eq!(reread.items[0].price, dec!(2500));
        shop.system.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_unknown_region_uses_default_price() {
        let shop = shop().await;
        let items = vec![CartLine::new(shop.tray.clone(), 1)];
        let id = shop.system.storefront.place_order(checkout("0661223344", "Tamanrasset", items)).await.unwrap();

        let order = shop.system.order_client.get_order(id).await.unwrap().unwrap();
        assert_eq!(order.delivery_price, dec!(500));
        assert_eq!(order.total_amount, dec!(1250));
    }

    #[tokio::test]
    async fn test_rejected_checkouts_persist_nothing() {
        let shop = shop().await;

        let err = shop.system.storefront.place_order(checkout("0550111222", "Algiers", vec![])).await.unwrap_err();
        assert!(matches!(err, OrderError::ValidationError(_)));

        let missing = vec![CartLine::new("product_99", 1)];
        let err = shop.system.storefront.place_order(checkout("0550111222", "Algiers", missing)).await.unwrap_err();
        assert!(matches!(err, OrderError::NotFound(_)));

        assert!(shop.system.order_client.list_orders(None).await.unwrap().is_empty());
        assert!(shop.system.customer_client.list_customers().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_repeat_customer_and_failed_delivery_scenario() {
        let shop = shop().await;
        let system = &shop.system;

        let first = shop.place("0550111222").await;
        let customer = system.customer_client.find_by_phone("0550111222").await.unwrap().unwrap();
        assert_eq!(customer.total_orders, 1);

        shop.ship(&first).await;
        let order = system.order_client.report_not_delivered(first.clone()).await.unwrap();
        assert_eq!(order.status, OrderStatus::Shipped);

        let after = system.customer_client.find_by_phone("0550111222").await.unwrap().unwrap();
        assert_eq!(after.warnings, 1);
        assert_eq!(after.total_orders, 1);
        assert_eq!(after.is_reliable(), customer.is_reliable());

        let second = shop.place("+213 550 111 222").await;
        assert_ne!(first, second);
        let again = system.customer_client.find_by_phone("0550111222").await.unwrap().unwrap();
        assert_eq!(again.id, customer.id);
        assert_eq!(again.total_orders, 2);
        assert_eq!(system.customer_client.list_customers().await.unwrap().len(), 1);
        assert_eq!(system.order_client.orders_for_customer(customer.id).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_deliveries_build_reliability() {
        let shop = shop().await;
        let system = &shop.system;

        let mut reliability = Vec::new();
        for _ in 0..3 {
            let id = shop.place("0770445566").await;
            shop.ship(&id).await;
            let order = system.order_client.confirm_delivery(id).await.unwrap();
            assert_eq!(order.status, OrderStatus::Delivered);
            let customer = system.customer_client.find_by_phone("0770445566").await.unwrap().unwrap();
            reliability.push((customer.delivered_orders, customer.is_reliable()));
        }
        assert_eq!(reliability, vec![(1, false), (2, false), (3, true)]);

        let customer = system.customer_client.find_by_phone("0770445566").await.unwrap().unwrap();
        assert_eq!(system.customer_client.reliability(&customer).to_string(), "reliable");
    }

    #[tokio::test]
    async fn test_reject_and_illegal_transitions() {
        let shop = shop().await;
        let orders = &shop.system.order_client;
        let id = shop.place("0550111222").await;

        assert!(matches!(orders.reject(id.clone(), String::new()).await, Err(OrderError::ValidationError(_))));
        assert!(matches!(orders.ship(id.clone()).await, Err(OrderError::InvalidTransition(_))));
        assert!(matches!(orders.confirm_delivery(id.clone()).await, Err(OrderError::InvalidTransition(_))));
        assert_eq!(orders.get_order(id.clone()).await.unwrap().unwrap().status, OrderStatus::Pending);

        let rejected = orders.reject(id.clone(), "too slow".into()).await.unwrap();
        assert_eq!(rejected.status, OrderStatus::Rejected);
        assert_eq!(rejected.rejection_reason.as_deref(), Some("too slow"));
        assert!(matches!(orders.accept(id).await, Err(OrderError::InvalidTransition(_))));

        assert!(matches!(orders.accept("order_404".into()).await, Err(OrderError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete_only_finished_orders() {
        let shop = shop().await;
        let orders = &shop.system.order_client;
        let id = shop.place("0550111222").await;

        assert!(matches!(orders.delete_order(id.clone()).await, Err(OrderError::InvalidTransition(_))));
        orders.reject(id.clone(), "out of stock".into()).await.unwrap();
        orders.delete_order(id.clone()).await.unwrap();
        assert!(orders.get_order(id.clone()).await.unwrap().is_none());
        assert!(matches!(orders.delete_order(id).await, Err(OrderError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delivery_for_deleted_customer_still_completes() {
        let shop = shop().await;
        let system = &shop.system;
        let id = shop.place("0550111222").await;
        shop.ship(&id).await;

        let customer = system.customer_client.find_by_phone("0550111222").await.unwrap().unwrap();
        system.customer_client.delete_customer(customer.id).await.unwrap();

        let order = system.order_client.confirm_delivery(id).await.unwrap();
        assert_eq!(order.status, OrderStatus::Delivered);
        assert!(system.customer_client.list_customers().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stats_and_listing() {
        let shop = shop().await;
        let orders = &shop.system.order_client;

        let delivered = shop.place("0550111222").await;
        shop.ship(&delivered).await;
        orders.confirm_delivery(delivered.clone()).await.unwrap();
        let rejected = shop.place("0550111222").await;
        orders.reject(rejected, "duplicate".into()).await.unwrap();
        shop.place("0661223344").await;

        let stats = orders.stats().await.unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.count(OrderStatus::Delivered), 1);
        assert_eq!(stats.count(OrderStatus::Rejected), 1);
        assert_eq!(stats.count(OrderStatus::Pending), 1);
        assert_eq!(stats.count(OrderStatus::Shipped), 0);
        assert_eq!(stats.delivered_revenue, dec!(2900));

        let pending = orders.list_orders(Some(OrderStatus::Pending)).await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(orders.list_orders(None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_admin_console_requires_session() {
        let shop = shop().await;
        let admin = &shop.system.admin;
        let id = shop.place("0550111222").await;

        assert_eq!(admin.login("guess").unwrap_err(), AuthError::InvalidCredentials);

        let session = admin.login(PASSWORD).unwrap();
        {
            let scope = admin.authorize(&session).unwrap();
            scope.accept(id.clone()).await.unwrap();
            let invoice = scope.invoice(id.clone()).await.unwrap();
            assert!(invoice.contains("Pressure cooker"));
            assert!(invoice.contains("Total: 2900"));
            assert_eq!(scope.customers().await.unwrap().len(), 1);

            admin.logout(&session);
            let err = scope.ship(id.clone()).await.unwrap_err();
            assert_eq!(err, AdminError::Auth(AuthError::InvalidSession));
        }

        assert_eq!(admin.authorize(&session).err(), Some(AuthError::InvalidSession));
        let order = shop.system.order_client.get_order(id).await.unwrap().unwrap();
        assert_eq!(order.status, OrderStatus::Accepted);
    }

    #[tokio::test]
    async fn test_admin_console_closed_without_configured_password() {
        let system = LedgerSystem::new(&Config::default());
        assert_eq!(system.admin.login("").unwrap_err(), AuthError::LoginDisabled);
        assert_eq!(system.admin.login("anything").unwrap_err(), AuthError::LoginDisabled);
    }

    #[tokio::test]
    async fn test_expired_session_cannot_mutate() {
        let shop = shop().await;
        let admin = &shop.system.admin;
        let id = shop.place("0550111222").await;

        let session = admin.login(PASSWORD).unwrap();
        let scope = admin.authorize(&session).unwrap();
        admin.logout(&session);

        assert!(matches!(scope.reject(id.clone(), "late".into()).await, Err(AdminError::Auth(_))));
        assert!(matches!(scope.set_rate("Algiers", dec!(1)).await, Err(AdminError::Auth(_))));
        assert!(matches!(scope.delete_customer("customer_1".into()).await, Err(AdminError::Auth(_))));

        assert_eq!(shop.system.order_client.get_order(id).await.unwrap().unwrap().status, OrderStatus::Pending);
        assert_eq!(shop.system.shipping_client.price_for("Algiers").await.unwrap(), dec!(400));
        assert_eq!(shop.system.customer_client.list_customers().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_storefront_quote_matches_checkout_charge() {
        let shop = shop().await;
        let quote = shop.system.storefront.quote_delivery(" Algiers ").await.unwrap();
        let items = vec![CartLine::new(shop.tray.clone(), 1)];
        let id = shop.system.storefront.place_order(checkout("0550111222", " Algiers ", items)).await.unwrap();
        let order = shop.system.order_client.get_order(id).await.unwrap().unwrap();
        assert_eq!(quote, dec!(400));
        assert_eq!(order.delivery_price, quote);
    }
}
