//! Demo entry point: drives one order from payment to delivery.

use domain::Aggregate;
use pizzashop::{AppError, Config, PizzaShop, telemetry};

fn main() -> Result<(), AppError> {
    // 1. Load configuration and initialize tracing
    let config = Config::from_env()?;
    telemetry::init_tracing(&config)?;

    // 2. Install Prometheus metrics recorder
    let metrics_handle = telemetry::install_metrics()?;

    // 3. Run the demo order
    let shop = PizzaShop::new();
    tracing::info!(pizzas = ?config.demo_pizzas, "running demo order");
    let outcome = shop.run_order(&config.demo_pizzas)?;

    match outcome.delivery_order {
        Some(delivery_order) => {
            println!(
                "{}",
                serde_json::to_string_pretty(&delivery_order.projection())?
            );
        }
        None => tracing::warn!(
            kitchen_order_ref = %outcome.kitchen_order.reference(),
            state = %outcome.kitchen_order.state(),
            "order did not reach delivery"
        ),
    }

    // 4. Render metrics
    if config.print_metrics {
        print!("{}", metrics_handle.render());
    }

    tracing::info!(events = shop.log().total_event_count(), "demo finished");
    Ok(())
}
