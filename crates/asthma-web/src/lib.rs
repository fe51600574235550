//! # 仪表盘 Web 模块
//!
//! 面向操作者的表单页面和 JSON API。

pub mod dashboard;
pub mod handlers;
pub mod server;
pub mod session;

pub use server::{build_router, WebServer};
pub use session::{Session, SharedSession};
