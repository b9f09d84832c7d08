// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::domain_name::Domain;

/// 探测协议
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scheme {
    Https,
    Http,
}

impl Scheme {
    /// 协议回退顺序：先 https，再 http
    pub const FALLBACK_ORDER: [Scheme; 2] = [Scheme::Https, Scheme::Http];

    pub fn prefix(&self) -> &'static str {
        match self {
            Scheme::Https => "https://",
            Scheme::Http => "http://",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Scheme::Https => write!(f, "https"),
            Scheme::Http => write!(f, "http"),
        }
    }
}

/// 暴露面探测规则
///
/// 一条规则由固定路径、响应体必须包含的关键字、可选的 Content-Type 要求
/// 以及结果输出目标（`id`）组成。规则在运行期间不可变。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeDefinition {
    /// 规则标识，同时决定结果输出目标
    pub id: String,
    /// 请求路径，以 `/` 开头
    pub path: String,
    /// 响应体必须包含的关键字
    pub keyword: String,
    /// Content-Type 必须包含的子串
    #[serde(default)]
    pub content_type: Option<String>,
}

impl ProbeDefinition {
    pub fn new(
        id: impl Into<String>,
        path: impl Into<String>,
        keyword: impl Into<String>,
        content_type: Option<&str>,
    ) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
            keyword: keyword.into(),
            content_type: content_type.map(str::to_string),
        }
    }

    /// 内置规则集
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::new("env", "/.env", "APP_KEY", None),
            Self::new("git", "/.git/config", "[core]", None),
            Self::new("phpinfo", "/phpinfo.php", "PHP Version", Some("text/html")),
        ]
    }

    /// 拼接某个协议下的完整探测地址
    pub fn url_for(&self, scheme: Scheme, domain: &Domain) -> String {
        format!("{}{}{}", scheme.prefix(), domain, self.path)
    }

    /// 判断 Content-Type 是否满足要求
    pub fn accepts_content_type(&self, content_type: Option<&str>) -> bool {
        match &self.content_type {
            None => true,
            Some(required) => content_type.is_some_and(|ct| ct.contains(required.as_str())),
        }
    }
}
