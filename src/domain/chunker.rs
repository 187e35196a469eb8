//! 故事文本分段器
//!
//! 将长文本按句子切分后贪心合并为有上限的分段，供故事模式逐段合成播放。
//! 第一段上限通常设置得更小，让音箱尽快出声。

/// 分段配置
#[derive(Debug, Clone)]
pub struct ChunkConfig {
    /// 第一段最大字符数
    pub first_chunk_max_chars: usize,
    /// 后续段最大字符数
    pub normal_chunk_max_chars: usize,
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            first_chunk_max_chars: 80,
            normal_chunk_max_chars: 200,
        }
    }
}

/// 检查是否为句末标点
#[inline]
fn is_sentence_terminal(ch: char) -> bool {
    matches!(ch, '。' | '？' | '！' | '；' | '.' | '?' | '!' | ';' | '\n')
}

/// 按句末标点切分为句子（标点保留在句尾）
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences: Vec<String> = Vec::new();
    let mut current = String::new();

    for ch in text.chars() {
        current.push(ch);
        if is_sentence_terminal(ch) {
            let trimmed = current.trim().to_string();
            if !trimmed.is_empty() {
                sentences.push(trimmed);
            }
            current.clear();
        }
    }

    // 剩余内容
    let trimmed = current.trim().to_string();
    if !trimmed.is_empty() {
        sentences.push(trimmed);
    }

    sentences
}

/// 对故事文本分段
///
/// 分段策略：
/// 1. 按句末标点切分为句子
/// 2. 贪心累积句子，加入下一句会超过上限时结束当前段
/// 3. 单句超长时独立成段，绝不从句中切断
///
/// 段序即播放序，不重排、不跳段。
pub fn chunk_story(text: &str, config: &ChunkConfig) -> Vec<String> {
    let mut chunks: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_chars = 0;

    for sentence in split_sentences(text) {
        let sentence_chars = sentence.chars().count();
        let limit = if chunks.is_empty() {
            config.first_chunk_max_chars
        } else {
            config.normal_chunk_max_chars
        };

        if !current.is_empty() && current_chars + sentence_chars > limit {
            chunks.push(std::mem::take(&mut current));
            current_chars = 0;
        }

        current.push_str(&sentence);
        current_chars += sentence_chars;
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}
