pub mod builtin_transport;
pub mod delivery;
pub mod faker;
pub mod generate_handler;
pub mod health_handler;
pub mod orchestrator;
pub mod process_transport;
pub mod ui_handler;
