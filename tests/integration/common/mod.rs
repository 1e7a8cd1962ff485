pub mod receiver;
pub mod test_server;
