//! Order processing: values forwarded between steps, one async step run on
//! the tokio runtime, and a failure that skips the shipping step.

use async_trait::async_trait;
use kusari::prelude::*;
use std::time::Duration;

#[derive(Debug, Clone)]
struct Order {
    id: u32,
    quantity: u32,
    unit_price: u64,
}

#[derive(Debug, thiserror::Error)]
#[error("payment declined for order {order}: {reason}")]
struct PaymentDeclined {
    order: u32,
    reason: &'static str,
}

/// Charges the order total against a pretend payment gateway.
struct ChargePayment {
    limit: u64,
}

#[async_trait]
impl AsyncStep<(Order, u64)> for ChargePayment {
    type Output = (Order, String);

    async fn execute(&self, (order, total): (Order, u64)) -> Result<(Order, String), BoxError> {
        tokio::time::sleep(Duration::from_millis(50)).await;
        if total > self.limit {
            return Err(PaymentDeclined {
                order: order.id,
                reason: "over limit",
            }
            .into());
        }
        let receipt = format!("receipt-{}-{}", order.id, total);
        Ok((order, receipt))
    }

    fn name(&self) -> StepName {
        StepName::new("charge")
    }
}

async fn process(order: Order) -> Result<(), SeriesError> {
    series()
        .with_label(format!("order-{}", order.id))
        .then_named("load", move |(): (), next: Next<(Order,)>| next.ok((order,)))
        .then_named("price", |(order,): (Order,), next: Next<(Order, u64)>| {
            if order.quantity == 0 {
                next.fail(format!("order {} has no items", order.id));
                return;
            }
            let total = u64::from(order.quantity) * order.unit_price;
            println!("Order {} totals {}", order.id, total);
            next.ok((order, total));
        })
        .then_named("charge", bridge::spawn(ChargePayment { limit: 10_000 }))
        .then_named("ship", |(order, receipt): (Order, String), next: Next<()>| {
            println!("Shipping order {} ({})", order.id, receipt);
            next.ok(());
        })
        .run_async()
        .await
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let orders = vec![
        Order {
            id: 1,
            quantity: 3,
            unit_price: 1_200,
        },
        Order {
            id: 2,
            quantity: 0,
            unit_price: 500,
        },
        Order {
            id: 3,
            quantity: 20,
            unit_price: 900,
        },
    ];

    for order in orders {
        let id = order.id;
        match process(order).await {
            Ok(()) => println!("Order {} shipped", id),
            Err(error) => {
                eprintln!("Order {} stopped: {}", id, error);
                if let Some(declined) = error.downcast_source::<PaymentDeclined>() {
                    eprintln!("  declined: {}", declined.reason);
                }
            }
        }
    }

    Ok(())
}
