//! Shows how to read the menu tree and update single variables and groups.
//!
//! ```bash
//! RUST_LOG=etaapi=debug cargo run --example read-variables -- heizung.local
//! ```

use etaapi::EtaClient;

fn main() -> etaapi::Result<()> {
    env_logger::init();
    let host = std::env::args()
        .nth(1)
        .expect("Expected the host of the heating system as first argument");

    let client = EtaClient::connect(host)?;

    // The nodes are the tab names on the ETAtouch display
    let mut nodes = client.get_nodes()?;
    println!("{}", nodes.keys().cloned().collect::<Vec<_>>().join(", "));

    let kessel = match nodes.get_mut("Kessel") {
        Some(kessel) => kessel,
        None => return Ok(()),
    };

    // Update only one variable
    if let Some(mut hours) = kessel.find_mut("Zählerstände/Volllaststunden") {
        println!("Without update: {}", *hours);
        hours.update(&client)?;
        println!("With single update: {}", *hours);
    }

    // Update several variables at once
    if let Some(mut counters) = kessel.find_mut("Zählerstände") {
        counters.update(&client)?;
        for var in counters.variables() {
            println!("With group update: {}", var);
        }
    }

    Ok(())
}
