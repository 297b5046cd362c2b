//! 콘솔 출력 모듈
//!
//! 파이프라인 알림을 진행률 바와 컬러 텍스트로 표시합니다.

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;

use crate::pipeline::ProgressSink;

/// 터미널 진행률 렌더러
pub struct ConsoleRenderer {
    pb: ProgressBar,
    verbose: bool,
    errors: Mutex<Vec<String>>,
}

impl ConsoleRenderer {
    /// 새 렌더러 생성
    ///
    /// # Arguments
    /// * `total` - 전체 파일 수 (진행률 바 길이)
    /// * `verbose` - 파일별 진행률까지 출력할지 여부
    pub fn new(total: usize, verbose: bool) -> Self {
        Self {
            pb: create_progress_bar(total),
            verbose,
            errors: Mutex::new(Vec::new()),
        }
    }

    /// 렌더링 없이 에러만 모으는 렌더러 (비대화형 환경용)
    pub fn hidden() -> Self {
        Self {
            pb: ProgressBar::hidden(),
            verbose: false,
            errors: Mutex::new(Vec::new()),
        }
    }

    /// 진행률 바 종료
    pub fn finish(&self) {
        self.pb.finish_with_message("완료!");
    }

    /// 지금까지 받은 에러 메시지
    pub fn errors(&self) -> Vec<String> {
        self.errors
            .lock()
            .map(|e| e.clone())
            .unwrap_or_else(|e| e.into_inner().clone())
    }
}

impl ProgressSink for ConsoleRenderer {
    fn render_progress(&self, current: usize, total: usize) {
        self.pb.set_length(total as u64);
        self.pb.set_position(current as u64);
    }

    fn render_error(&self, message: &str) {
        self.pb
            .println(format!("  {} {}", "❌".red(), message.bright_red()));
        self.errors
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(message.to_string());
    }

    fn render_success(&self, message: &str) {
        self.pb.println(format!("  {} {}", "✓".green(), message));
    }

    fn render_file_progress(&self, file_name: &str, percent: u8) {
        self.pb.set_message(format!("{} {}%", file_name, percent));
        if self.verbose {
            self.pb.println(format!(
                "    {} {:>3}% {}",
                "•".bright_cyan(),
                percent,
                file_name.dimmed()
            ));
        }
    }
}

/// 진행률 바 생성
fn create_progress_bar(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░"),
    );
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_renderer_collects_errors() {
        let renderer = ConsoleRenderer::hidden();
        renderer.render_success("ok");
        renderer.render_error("first");
        renderer.render_file_progress("a.txt", 50);
        renderer.render_error("second");

        assert_eq!(renderer.errors(), vec!["first", "second"]);
    }

    #[test]
    fn test_progress_updates_position() {
        let renderer = ConsoleRenderer::hidden();
        renderer.render_progress(3, 10);

        assert_eq!(renderer.pb.position(), 3);
        assert_eq!(renderer.pb.length(), Some(10));
    }
}
