//! 语音指令解释器
//!
//! 对识别出的语音文本进行分类：停止播放 / 进入对话模式 / 退出对话模式 /
//! AI 问答 / 忽略（交回音箱默认处理）。
//!
//! 匹配规则：
//! - 停止与模式切换指令先做归一化（去空白和标点）后再比较
//! - 唤醒关键词用原文做包含匹配，保证多字关键词的边界语义
//! - 意图文本取原文中首个关键词之后的内容，去掉前导标点和空白

/// 分类规则（来自唤醒配置）
#[derive(Debug, Clone, Default)]
pub struct InterpreterRules {
    /// 唤醒关键词（原文包含即触发问答）
    pub wake_keywords: Vec<String>,
    /// 进入对话模式的完整指令
    pub enter_phrases: Vec<String>,
    /// 退出对话模式的完整指令
    pub exit_phrases: Vec<String>,
    /// 停止播放关键词
    pub stop_keywords: Vec<String>,
}

/// 分类结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceCommand {
    /// 停止播放
    Stop,
    /// 进入 AI 对话模式
    EnterAiMode,
    /// 退出 AI 对话模式
    ExitAiMode,
    /// AI 问答，携带提取出的意图文本（可能为空）
    Query { intent: String },
    /// 非指令，交回音箱默认处理
    Ignore,
}

/// 判断是否为应被归一化剔除的标点
#[inline]
fn is_punctuation(ch: char) -> bool {
    ch.is_ascii_punctuation()
        || matches!(
            ch,
            '，' | '。' | '！' | '？' | '、' | '；' | '：' | '“' | '”' | '‘' | '’'
                | '（' | '）' | '《' | '》' | '【' | '】' | '…' | '—' | '·'
        )
}

/// 归一化文本：去掉所有空白和标点
fn normalize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_whitespace() && !is_punctuation(*c))
        .collect()
}

/// 去掉前导标点和空白
fn strip_leading_punct(text: &str) -> &str {
    text.trim_start_matches(|c: char| c.is_whitespace() || is_punctuation(c))
}

/// 对一条识别文本分类
///
/// `ai_mode_active` 为当前会话是否处于 AI 对话模式。
/// 停止指令在任何状态下优先匹配；模式切换要求归一化后完全相等。
pub fn classify(text: &str, ai_mode_active: bool, rules: &InterpreterRules) -> VoiceCommand {
    let normalized = normalize(text);
    if normalized.is_empty() {
        return VoiceCommand::Ignore;
    }

    // 停止指令：归一化后包含匹配
    for keyword in &rules.stop_keywords {
        let kw = normalize(keyword);
        if !kw.is_empty() && normalized.contains(&kw) {
            return VoiceCommand::Stop;
        }
    }

    // 模式切换：归一化后完全相等
    if !ai_mode_active {
        for phrase in &rules.enter_phrases {
            if normalized == normalize(phrase) {
                return VoiceCommand::EnterAiMode;
            }
        }
    } else {
        for phrase in &rules.exit_phrases {
            if normalized == normalize(phrase) {
                return VoiceCommand::ExitAiMode;
            }
        }
    }

    // 对话模式下所有文本都是问答，意图为整句
    if ai_mode_active {
        return VoiceCommand::Query {
            intent: text.trim().to_string(),
        };
    }

    // 唤醒关键词：原文包含匹配，意图取首个关键词之后的内容
    for keyword in &rules.wake_keywords {
        if keyword.is_empty() {
            continue;
        }
        if let Some(pos) = text.find(keyword.as_str()) {
            let after = &text[pos + keyword.len()..];
            return VoiceCommand::Query {
                intent: strip_leading_punct(after).to_string(),
            };
        }
    }

    VoiceCommand::Ignore
}
