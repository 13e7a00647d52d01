//! Two clients logging through the process-wide shared logger from separate
//! threads, followed by the same exchange through an injected logger.

use std::sync::Arc;
use std::thread;

use log::LevelFilter;

use sole::logger::{self, Logger};
use sole::Coordinator;

fn client_logs(id: usize) {
    let logger = logger::get_shared();
    if let Err(err) = logger.emit(format_args!("This message is from client{}", id)) {
        eprintln!("client{} failed to log: {}", id, err);
    }
}

fn main() {
    if let Err(err) = logger::get_shared().install(LevelFilter::Debug) {
        eprintln!("failed to install the shared logger: {}", err);
    }

    let handles: Vec<_> = (1..=2).map(|id| thread::spawn(move || client_logs(id))).collect();
    for handle in handles {
        handle.join().expect("client thread panicked");
    }

    println!("instances of the shared logger: {}", logger::construction_count());

    // the same, but with a logger handed to the clients explicitly; its
    // construction is reported through the shared logger installed above
    let injected = Arc::new(Coordinator::new(Logger::stderr));
    let handles: Vec<_> = (1..=2)
        .map(|id| {
            let injected = Arc::clone(&injected);
            thread::spawn(move || {
                let logger = Coordinator::get_shared(&*injected);
                logger.emit(format_args!("This message is from client{}", id))
            })
        })
        .collect();

    for handle in handles {
        if let Err(err) = handle.join().expect("client thread panicked") {
            eprintln!("failed to log: {}", err);
        }
    }

    println!("instances of the injected logger: {}", Coordinator::construction_count(&*injected));
}
