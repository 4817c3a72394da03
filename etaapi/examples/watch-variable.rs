//! Polls a single variable and prints its value whenever it changes.
//!
//! It expects the host and the uri of the variable as arguments. Example:
//!
//! ```bash
//! cargo run --example watch-variable -- heizung.local /112/10021/0/11109/0
//! ```

use etaapi::{EtaClient, EtaError, Variable};
use std::{env::args, thread, time::Duration};

fn main() -> Result<(), EtaError> {
    env_logger::init();
    let mut args = args().skip(1);
    let host = args
        .next()
        .expect("Expected the host to be provided on the command line");
    let uri = args
        .next()
        .expect("Expected the variable uri to be provided on the command line");

    let client = EtaClient::builder(host)
        .timeout(Duration::from_secs(10))
        .connect()?;
    let mut var = Variable::new(&uri, &uri);
    let mut last: Option<String> = None;

    loop {
        client.update_variable(&mut var)?;
        let current = var.str_value().map(str::to_string);
        if current != last {
            println!(
                "{} {} {} ({:?})",
                var.last_updated()
                    .map(|t| t.format("%H:%M:%S").to_string())
                    .unwrap_or_default(),
                current.as_deref().unwrap_or(""),
                var.unit(),
                var.normalized_value()
            );
            last = current;
        }
        thread::sleep(Duration::from_secs(5));
    }
}
