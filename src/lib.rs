pub mod core {
    pub mod config;
    pub mod context;
    pub mod error;
    pub mod routes;
    pub mod startup;
    pub mod state;
    pub mod tracing_init;
}

pub mod backend {
    pub mod grpc;
    pub mod memory;
    pub mod postgres;
    pub mod service;

    #[cfg(test)]
    pub mod testing;
}

pub mod endpoint {
    pub mod base;
    pub mod users;
}

pub mod middleware {
    pub mod auth;
}

pub mod transport {
    pub mod http;
}

pub mod rpc {
    pub mod proto;
    pub mod server;
}

pub mod handlers {
    pub mod fallback;
    pub mod health;
    pub mod users;
}

pub mod models {
    pub mod dto;
    pub mod user;
}

pub mod utils {
    pub mod auth;
}
