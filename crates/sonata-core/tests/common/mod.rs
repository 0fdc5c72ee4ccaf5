pub mod plain_server;
