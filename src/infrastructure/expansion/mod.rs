// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 子域名扩展模块
pub mod subdomain_client;

pub use subdomain_client::{DisabledSubdomainProvider, HttpSubdomainProvider, SubdomainProvider};
