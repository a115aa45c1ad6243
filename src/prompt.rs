//! 対話式ラベル定義
//!
//! 空行で終了。`ID=NAME` を1行ずつ入力する。

use crate::config::parse_label_spec;
use crate::error::{AnnotatorError, Result};
use bbox_annotator_common::LabelManager;
use dialoguer::Input;

/// 1行分の入力結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelInput {
    /// 入力終了
    Done,
    /// 追加（同一ペアの再入力も含む）
    Added(i64, String),
    /// IDが別名で使用中
    Conflict(i64, String),
    /// 形式エラー
    Invalid(String),
}

/// 1行を解釈してラベルに反映
pub fn apply_label_input(labels: &mut LabelManager, line: &str) -> LabelInput {
    let line = line.trim();
    if line.is_empty() {
        return LabelInput::Done;
    }

    match parse_label_spec(line) {
        Ok((id, name)) => {
            if labels.add(id, name.clone()) {
                LabelInput::Added(id, name)
            } else {
                let existing = labels.get_name(id).unwrap_or_default().to_string();
                LabelInput::Conflict(id, existing)
            }
        }
        Err(e) => LabelInput::Invalid(e.to_string()),
    }
}

/// 対話式でラベルを追加し、追加件数を返す
pub fn run_interactive_labels(labels: &mut LabelManager) -> Result<usize> {
    println!("ラベルを ID=NAME 形式で入力してください（空行で終了）");
    let mut added = 0;

    loop {
        let line: String = Input::new()
            .with_prompt("ラベル")
            .allow_empty(true)
            .interact_text()
            .map_err(|e| AnnotatorError::Interactive(e.to_string()))?;

        match apply_label_input(labels, &line) {
            LabelInput::Done => break,
            LabelInput::Added(id, name) => {
                println!("  ✔ {}: {}", id, name);
                added += 1;
            }
            LabelInput::Conflict(id, existing) => {
                println!("  ✖ ID {} は既に \"{}\" で使われています", id, existing);
            }
            LabelInput::Invalid(message) => println!("  ✖ {}", message),
        }
    }

    Ok(added)
}
