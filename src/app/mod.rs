//! 应用层流量
//!
//! 目前只有 UDP 风格的回显服务端/客户端。

pub mod echo;
