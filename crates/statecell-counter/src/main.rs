use anyhow::Result;
use statecell::{
    apply_middleware, create_store, CombinedState, LoggingMiddleware, Middleware, Store,
    StoreConfig,
};
use std::cell::RefCell;
use std::io::{self, BufRead, Write};
use std::rc::Rc;

mod commands;
mod config;
mod reducers;

use commands::Command;
use config::CounterConfig;

fn main() -> Result<()> {
    env_logger::init();

    let config = CounterConfig::load();
    log::info!("Starting statecell-counter");

    let store = build_store(&config)?;
    watch_counter(&store)?;

    println!("{}", commands::HELP);
    run(&store, io::stdin().lock())?;

    log::info!("Exiting statecell-counter");
    Ok(())
}

fn build_store(config: &CounterConfig) -> Result<Store<CombinedState>> {
    let mut middleware: Vec<Box<dyn Middleware<CombinedState>>> = Vec::new();
    if config.log_actions {
        middleware.push(Box::new(LoggingMiddleware::new()));
    }

    let preloaded = CombinedState::new().with(reducers::COUNTER, config.initial_count);
    let store = create_store(
        reducers::root_reducer(config.initial_count, config.step, config.history_limit),
        StoreConfig::new()
            .preloaded_state(Rc::new(preloaded))
            .enhancer(apply_middleware(middleware)),
    )?;
    Ok(store)
}

/// Print the counter whenever its slice changes
fn watch_counter(store: &Store<CombinedState>) -> Result<()> {
    let handle = store.clone();
    let last = RefCell::new(store.get_state()?.slice(reducers::COUNTER).cloned());

    store.subscribe(move || {
        let Ok(state) = handle.get_state() else {
            return;
        };
        let current = state.slice(reducers::COUNTER).cloned();
        let changed = match (&*last.borrow(), &current) {
            (Some(previous), Some(current)) => !Rc::ptr_eq(previous, current),
            _ => true,
        };
        if changed {
            if let Some(value) = state.get::<i64>(reducers::COUNTER) {
                println!("counter = {}", value);
            }
            *last.borrow_mut() = current;
        }
    })?;
    Ok(())
}

fn run(store: &Store<CombinedState>, input: impl BufRead) -> Result<()> {
    prompt()?;
    for line in input.lines() {
        let line = line?;
        match commands::parse(&line) {
            Ok(Command::Quit) => break,
            Ok(Command::Help) => println!("{}", commands::HELP),
            Ok(Command::Show) => print_state(store)?,
            Ok(Command::Dispatch(action)) => {
                if let Err(e) = store.dispatch(action) {
                    eprintln!("Error: {}", e);
                }
            }
            Ok(Command::Raw(value)) => {
                if let Err(e) = store.dispatch_value(value) {
                    eprintln!("Error: {}", e);
                }
            }
            Err(message) => eprintln!("{}", message),
        }
        prompt()?;
    }
    Ok(())
}

fn print_state(store: &Store<CombinedState>) -> Result<()> {
    let state = store.get_state()?;
    let counter = state.get::<i64>(reducers::COUNTER).map(|v| *v);
    let history = state
        .get::<Vec<String>>(reducers::HISTORY)
        .map(|h| h.join(", "))
        .unwrap_or_default();
    println!("counter = {:?}, recent = [{}]", counter, history);
    Ok(())
}

fn prompt() -> io::Result<()> {
    print!("> ");
    io::stdout().flush()
}
