//! 商品与价格历史模块

pub mod handler;
pub mod model;
pub mod service;
