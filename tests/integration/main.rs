// Integration tests for shard streaming against a local websocket server

mod shard_stream;
