use serde::{Deserialize, Serialize};
use std::fmt;

/// A user-visible alert (title + message) produced by a failed or rejected operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

impl Alert {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn load_failed() -> Self {
        Self::new("提示", "数据加载失败，请检查网络")
    }

    pub fn invalid_media_url() -> Self {
        Self::new("提示", "无效的音频链接")
    }

    pub fn playback_failed() -> Self {
        Self::new("播放失败", "无法加载音频资源")
    }

    pub fn invalid_cohort_code() -> Self {
        Self::new("无效代码", "该研究代码不存在或已失效")
    }

    pub fn network_failed() -> Self {
        Self::new("错误", "网络请求失败，请稍后重试")
    }

    pub fn save_failed() -> Self {
        Self::new("保存失败", "存储数据时发生错误，请重试")
    }

    pub fn notification_permission_denied() -> Self {
        Self::new("权限不足", "请在手机设置中允许发送通知，以便接收每日提醒。")
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.title, self.message)
    }
}

impl std::error::Error for Alert {}
