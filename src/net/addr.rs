//! 子网分配
//!
//! 每条链路独占一个子网。子网按整数序号严格递增地分配，序号映射为
//! `prefix0.prefix1.index.0` 形式的地址段，掩码固定。

use serde::Serialize;
use std::fmt;
use std::net::Ipv4Addr;

/// 第一个分配出去的子网序号
pub const FIRST_SUBNET_INDEX: u32 = 1;
/// 第三个八位组能表示的最大序号
pub const LAST_SUBNET_INDEX: u32 = 255;

/// 一个地址段：`base/mask`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Subnet {
    pub index: u32,
    pub base: Ipv4Addr,
    pub mask: Ipv4Addr,
}

impl Subnet {
    /// 段内第 `n` 个主机地址（`.1` 是链路的第一端，`.2` 是第二端）
    pub fn host(&self, n: u32) -> Ipv4Addr {
        Ipv4Addr::from(u32::from(self.base).wrapping_add(n))
    }

    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        let mask = u32::from(self.mask);
        u32::from(addr) & mask == u32::from(self.base) & mask
    }

    pub fn prefix_len(&self) -> u32 {
        u32::from(self.mask).leading_ones()
    }
}

impl fmt::Display for Subnet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.prefix_len())
    }
}

/// 子网分配器：每次 `next()` 返回一个从未返回过的子网。
///
/// 调用方必须按全局约定的顺序消费（见拓扑构建器），顺序决定了哪条链路拿到哪个地址段，
/// 但任何顺序都不会产生冲突。
#[derive(Debug, Clone)]
pub struct SubnetAllocator {
    prefix: [u8; 2],
    mask: Ipv4Addr,
    next_index: u32,
}

impl SubnetAllocator {
    pub fn new(prefix: [u8; 2], mask: Ipv4Addr) -> Self {
        Self {
            prefix,
            mask,
            next_index: FIRST_SUBNET_INDEX,
        }
    }

    /// 掩码是否能容纳 `x.y.index.0` 形式的地址段，且 `.1`、`.2` 都是段内主机（连续，/24 到 /30）
    pub fn mask_is_valid(mask: Ipv4Addr) -> bool {
        let bits = u32::from(mask);
        bits.leading_ones() + bits.trailing_zeros() == 32 && (24..=30).contains(&bits.leading_ones())
    }

    /// 分配器总共能提供的子网数
    pub fn capacity() -> usize {
        (LAST_SUBNET_INDEX - FIRST_SUBNET_INDEX + 1) as usize
    }

    /// 还能分配的子网数
    pub fn remaining(&self) -> usize {
        (LAST_SUBNET_INDEX + 1).saturating_sub(self.next_index) as usize
    }

    /// 已分配的子网数
    pub fn allocated(&self) -> usize {
        (self.next_index - FIRST_SUBNET_INDEX) as usize
    }
}

impl Default for SubnetAllocator {
    fn default() -> Self {
        Self::new([10, 0], Ipv4Addr::new(255, 255, 255, 0))
    }
}

impl Iterator for SubnetAllocator {
    type Item = Subnet;

    fn next(&mut self) -> Option<Subnet> {
        if self.next_index > LAST_SUBNET_INDEX {
            return None;
        }
        let index = self.next_index;
        self.next_index += 1;
        Some(Subnet {
            index,
            base: Ipv4Addr::new(self.prefix[0], self.prefix[1], index as u8, 0),
            mask: self.mask,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining();
        (n, Some(n))
    }
}
