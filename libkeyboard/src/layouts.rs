// libkeyboard/src/layouts.rs
//
// Bundled keyboard presets.
//
// - english: the stock QWERTY layout
// - hebrew: Hebrew letters on the QWERTY positions, right-to-left
// - pinyin: QWERTY plus a small pinyin → hanzi candidate table

use libkeyboard_core::{KeyboardOptions, Layout, DEFAULT_LAYOUT_NAME, SHIFT_LAYOUT_NAME};
use once_cell::sync::Lazy;
use std::collections::BTreeMap;

/// Names accepted by [`preset`].
pub const PRESET_NAMES: &[&str] = &["english", "hebrew", "pinyin"];

/// Options for a bundled preset, or `None` for an unknown name.
pub fn preset(name: &str) -> Option<KeyboardOptions> {
    let mut options = KeyboardOptions::default();
    match name.to_ascii_lowercase().as_str() {
        "english" => {
            options.layout = english();
        }
        "hebrew" => {
            options.layout = hebrew();
            options.rtl = true;
        }
        "pinyin" => {
            options.layout = english();
            options.layout_candidates = PINYIN_CANDIDATES
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
        }
        _ => return None,
    }
    Some(options)
}

pub fn english() -> Layout {
    Layout::qwerty()
}

pub fn hebrew() -> Layout {
    let mut layout = Layout::new();
    layout.insert(
        DEFAULT_LAYOUT_NAME,
        [
            "` 1 2 3 4 5 6 7 8 9 0 - = {bksp}",
            "{tab} / ' ק ר א ט ו ן ם פ ] [ \\",
            "{lock} ש ד ג כ ע י ח ל ך ף , {enter}",
            "{shift} ז ס ב ה נ מ צ ת ץ . {shift}",
            ".com @ {space}",
        ],
    );
    layout.insert(
        SHIFT_LAYOUT_NAME,
        [
            "~ ! @ # $ % ^ & * ( ) _ + {bksp}",
            "{tab} Q W E R T Y U I O P { } |",
            "{lock} A S D F G H J K L : \" {enter}",
            "{shift} Z X C V B N M < > ? {shift}",
            ".com @ {space}",
        ],
    );
    layout
}

/// Pinyin syllable → candidate characters, most frequent first.
static PINYIN_CANDIDATES: Lazy<BTreeMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut m = BTreeMap::new();
    m.insert("a", "啊 阿 呵 吖");
    m.insert("ai", "爱 哎 挨 埃 癌 矮 艾 碍");
    m.insert("de", "的 得 地 德");
    m.insert("guo", "国 过 果 锅 郭 裹");
    m.insert("hao", "好 号 浩 豪 毫 耗 郝");
    m.insert("ma", "吗 妈 马 嘛 麻 骂 码");
    m.insert("men", "们 门 闷 扪");
    m.insert("ni", "你 尼 泥 呢 腻 逆 拟 妮");
    m.insert("shi", "是 时 事 十 市 使 世 式 师 实");
    m.insert("wo", "我 握 窝 卧 沃 蜗");
    m.insert("xie", "谢 些 写 鞋 协 斜 血");
    m.insert("zhong", "中 种 重 众 钟 终 忠");
    m
});
