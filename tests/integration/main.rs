mod common;
mod delivery_test;
mod generator_process_test;
mod health_test;
