/// Simple localization support for the duplicate refiner form.
/// Locale can be selected via the `--locale` CLI flag (e.g. `--locale zh`).

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    #[default]
    En,
    Zh,
}

impl Locale {
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "zh" | "zh-cn" | "zh_cn" | "zh-hans" | "zh-tw" | "zh_tw" => Self::Zh,
            _ => Self::En,
        }
    }
}

#[derive(Debug)]
pub struct Messages {
    pub heading: &'static str,
    pub intro: &'static str,
    pub input_label: &'static str,
    pub input_placeholder: &'static str,
    pub empty_input_alert: &'static str,
    pub progress_analyzing: &'static str,
    pub progress_complete: &'static str,
    pub failed_to_start: &'static str,
    pub unknown_error: &'static str,
    pub submit_idle: &'static str,
    pub submit_busy: &'static str,
    pub title_processing: &'static str,
    pub title_completed: &'static str,
    pub title_error: &'static str,
    pub download_ready: &'static str,
    pub download_action: &'static str,
    pub busy_rejected: &'static str,
    pub nothing_to_download: &'static str,
}

pub static EN: Messages = Messages {
    heading: "🔍 Duplicate Item Refiner",
    intro: "Enter your organization ID to find and analyze duplicate items",
    input_label: "Organization ID:",
    input_placeholder: "e.g., 867850976",
    empty_input_alert: "Please enter an organization ID",
    progress_analyzing: "Analyzing duplicates...",
    progress_complete: "Analysis complete!",
    failed_to_start: "Failed to start processing",
    unknown_error: "Unknown error",
    submit_idle: "Analyze Duplicates",
    submit_busy: "Processing...",
    title_processing: "⏳ Processing...",
    title_completed: "✅ Completed!",
    title_error: "❌ Error",
    download_ready: "Your duplicate analysis is ready!",
    download_action: "📊 Download Excel Report",
    busy_rejected: "A submission is already in progress",
    nothing_to_download: "No report to download yet",
};

pub static ZH: Messages = Messages {
    heading: "🔍 重复项清理工具",
    intro: "输入组织 ID 以查找并分析重复项",
    input_label: "组织 ID：",
    input_placeholder: "例如 867850976",
    empty_input_alert: "请输入组织 ID",
    progress_analyzing: "正在分析重复项...",
    progress_complete: "分析完成！",
    failed_to_start: "无法开始处理",
    unknown_error: "未知错误",
    submit_idle: "分析重复项",
    submit_busy: "处理中...",
    title_processing: "⏳ 处理中...",
    title_completed: "✅ 已完成！",
    title_error: "❌ 错误",
    download_ready: "重复项分析已就绪！",
    download_action: "📊 下载 Excel 报告",
    busy_rejected: "已有提交正在处理",
    nothing_to_download: "暂无可下载的报告",
};

pub fn get_messages(locale: Locale) -> &'static Messages {
    match locale {
        Locale::En => &EN,
        Locale::Zh => &ZH,
    }
}
