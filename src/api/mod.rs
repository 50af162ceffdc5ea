// Thin namespace wrapper for API-layer components
pub mod handlers {
    pub use crate::handlers::*;
}

pub mod extract {
    pub use crate::extract::*;
}

pub mod openapi {
    pub use crate::openapi::*;
}
