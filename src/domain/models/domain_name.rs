// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

static HOST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z0-9_](?:[a-z0-9_-]*[a-z0-9_])?(?:\.[a-z0-9_](?:[a-z0-9_-]*[a-z0-9_])?)*$")
        .unwrap()
});

const MAX_DOMAIN_LEN: usize = 253;

/// 域名解析错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("empty domain")]
    Empty,
    #[error("domain too long: {0} bytes")]
    TooLong(usize),
    #[error("invalid host name: {0}")]
    Invalid(String),
}

/// 规范化后的主机名
///
/// 所有来源（种子、子域名扩展、证书流）产生的域名都先经过规范化：
/// 去除首尾空白、转小写、去掉末尾的 `.`，以及证书 SAN 中常见的 `*.` 通配前缀。
/// 两个域名相等当且仅当规范化后的字符串相等。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Domain(String);

impl Domain {
    /// 解析并规范化域名
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let mut host = raw.trim().to_ascii_lowercase();
        if let Some(stripped) = host.strip_prefix("*.") {
            host = stripped.to_string();
        }
        if host.ends_with('.') {
            host.pop();
        }

        if host.is_empty() {
            return Err(DomainError::Empty);
        }
        if host.len() > MAX_DOMAIN_LEN {
            return Err(DomainError::TooLong(host.len()));
        }
        if !HOST_RE.is_match(&host) {
            return Err(DomainError::Invalid(host));
        }

        Ok(Self(host))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Domain {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Domain {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Domain> for String {
    fn from(domain: Domain) -> Self {
        domain.0
    }
}

impl AsRef<str> for Domain {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
