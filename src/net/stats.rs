//! 统计信息
//!
//! 一次运行的聚合流量计数器，由周期监视器按 tick 采样。

use serde::Serialize;

/// 网络统计信息
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct Stats {
    /// 客户端发出的回显请求数
    pub sent_pkts: u64,
    /// 到达目的节点的回显请求数
    pub received_pkts: u64,
    pub received_bytes: u64,
    /// 回到客户端的回显应答数
    pub echo_replies: u64,
    /// 找不到路由或目的地址而丢弃的包
    pub dropped_pkts: u64,
    /// 无法与发送时刻配对的接收
    pub unmatched_receives: u64,
    /// 链路上的逐跳转发次数
    pub forwarded_hops: u64,
}
