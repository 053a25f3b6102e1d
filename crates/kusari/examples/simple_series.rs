//! Three timer-driven steps that run strictly one after another.

use kusari::prelude::*;
use std::time::Duration;

fn delayed(label: &'static str, millis: u64) -> impl FnOnce(Done) + Send + 'static {
    move |next: Done| {
        println!("{label}: waiting {millis}ms...");
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(millis)).await;
            println!("{label}: done");
            next.done();
        });
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let series = simple_series()
        .with_label("timers")
        .then_named("slow", delayed("slow", 300))
        .then_named("medium", delayed("medium", 200))
        .then_named("fast", delayed("fast", 100));

    for step in series.steps() {
        println!("Planned {}", step);
    }

    match series.run_async().await {
        Ok(()) => println!("Series completed successfully"),
        Err(error) => eprintln!("Series failed: {}", error),
    }

    Ok(())
}
