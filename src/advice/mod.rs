//! Best-effort financial advice from a generative-AI endpoint.
//!
//! The engine state never changes here: the advisor works from an
//! immutable snapshot, makes a single attempt, and every failure collapses
//! into [`FALLBACK_ADVICE`].

pub mod client;

pub use client::{AdviceError, GeminiClient};

use crate::domain::AppState;

/// Advice shown when the endpoint cannot be reached for any reason.
pub const FALLBACK_ADVICE: &str =
    "Không thể kết nối với chuyên gia AI lúc này. Hãy kiểm tra lại ngân sách của bạn!";

/// Immutable snapshot of the figures the advisor prompt is built from.
#[derive(Debug, Clone, PartialEq)]
pub struct AdviceSnapshot {
    pub income: f64,
    /// Sum of ALL recorded transaction amounts, income and expense alike.
    /// The prompt presents this figure as actual spending, a long-standing
    /// quirk kept deliberately (see DESIGN.md).
    pub total_recorded: f64,
    /// Envelope name and percentage pairs, in display order.
    pub categories: Vec<(String, f64)>,
    pub transaction_count: usize,
    /// Account name and balance pairs, in display order.
    pub accounts: Vec<(String, f64)>,
}

impl AdviceSnapshot {
    pub fn capture(state: &AppState) -> Self {
        Self {
            income: state.income,
            total_recorded: state.transactions.iter().map(|txn| txn.amount).sum(),
            categories: state
                .categories
                .iter()
                .map(|category| (category.name.clone(), category.percentage))
                .collect(),
            transaction_count: state.transaction_count(),
            accounts: state
                .accounts
                .iter()
                .map(|account| (account.name.clone(), account.balance))
                .collect(),
        }
    }
}

/// Builds the Vietnamese advisor prompt for a snapshot.
pub fn build_prompt(snapshot: &AdviceSnapshot) -> String {
    let categories = snapshot
        .categories
        .iter()
        .map(|(name, percentage)| format!("{} ({}%)", name, fmt_number(*percentage)))
        .collect::<Vec<_>>()
        .join(", ");
    let accounts = snapshot
        .accounts
        .iter()
        .map(|(name, balance)| format!("{}: {} VND", name, fmt_number(*balance)))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Bạn là một chuyên gia tư vấn tài chính cá nhân. Dựa trên dữ liệu sau, \
         hãy đưa ra 3 lời khuyên ngắn gọn và thông minh bằng tiếng Việt:\n\
         - Thu nhập tháng: {income} VND\n\
         - Tổng chi tiêu thực tế: {total} VND\n\
         - Các hạng mục ngân sách: {categories}\n\
         - Số lượng giao dịch: {count}\n\
         - Danh sách tài khoản: {accounts}\n\
         \n\
         Yêu cầu:\n\
         1. Phân tích xem chi tiêu có vượt quá hạn mức \"Chi tiêu\" không.\n\
         2. Đề xuất cách tối ưu hóa dựa trên các quy tắc tài chính phổ biến.\n\
         3. Giọng văn chuyên nghiệp, khích lệ.\n\
         Phản hồi dưới định dạng Markdown.",
        income = fmt_number(snapshot.income),
        total = fmt_number(snapshot.total_recorded),
        categories = categories,
        count = snapshot.transaction_count,
        accounts = accounts,
    )
}

/// Makes one best-effort advice request. Never fails: any error is logged
/// and absorbed into the fallback string.
pub fn fetch_advice(client: &GeminiClient, snapshot: &AdviceSnapshot) -> String {
    match client.generate(&build_prompt(snapshot)) {
        Ok(text) if !text.trim().is_empty() => text,
        Ok(_) => {
            tracing::warn!("advice endpoint returned an empty answer");
            FALLBACK_ADVICE.into()
        }
        Err(err) => {
            tracing::warn!("advice request failed: {err}");
            FALLBACK_ADVICE.into()
        }
    }
}

/// Renders an amount the way the prompt always has: integral values
/// without a decimal point, everything else with its natural precision.
fn fmt_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
