//! # Audio 模块
//!
//! 音效队列：记录播放请求，由混音端每帧取走。
//!
//! 没有真实的音频输出；静音时直接丢弃请求。
//! 混音端长时间不取时只保留最近的 [`MAX_PENDING_CUES`] 个。

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use tracing::debug;
use transit_runtime::{AudioCue, AudioCuePlayer};

/// 待播放音效的上限
pub const MAX_PENDING_CUES: usize = 32;

#[derive(Debug, Default)]
struct QueueData {
    pending: VecDeque<AudioCue>,
    played: usize,
    muted: bool,
}

/// 音效队列（共享句柄）
#[derive(Debug, Clone, Default)]
pub struct CueQueue {
    inner: Rc<RefCell<QueueData>>,
}

impl CueQueue {
    /// 创建队列
    pub fn new(muted: bool) -> Self {
        Self {
            inner: Rc::new(RefCell::new(QueueData {
                muted,
                ..QueueData::default()
            })),
        }
    }

    /// 是否静音
    pub fn is_muted(&self) -> bool {
        self.inner.borrow().muted
    }

    /// 设置静音
    pub fn set_muted(&self, muted: bool) {
        self.inner.borrow_mut().muted = muted;
    }

    /// 取出待播放的音效
    pub fn drain(&self) -> Vec<AudioCue> {
        self.inner.borrow_mut().pending.drain(..).collect()
    }

    /// 尚未取走的音效数
    pub fn pending_len(&self) -> usize {
        self.inner.borrow().pending.len()
    }

    /// 累计接受的播放次数
    pub fn played_count(&self) -> usize {
        self.inner.borrow().played
    }
}

impl AudioCuePlayer for CueQueue {
    fn play(&mut self, cue: &AudioCue) {
        let mut data = self.inner.borrow_mut();
        if data.muted {
            debug!(cue = %cue, "静音中，丢弃音效");
            return;
        }
        if data.pending.len() >= MAX_PENDING_CUES
            && let Some(dropped) = data.pending.pop_front()
        {
            debug!(cue = %dropped, "音效队列已满，丢弃最旧的");
        }
        data.pending.push_back(cue.clone());
        data.played += 1;
    }
}
