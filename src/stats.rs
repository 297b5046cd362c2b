//! 통계 및 유틸리티 모듈
//!
//! 처리 통계 수집 및 포맷팅을 담당합니다.

use colored::Colorize;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

/// 처리 통계 구조체
///
/// 여러 작업 스레드에서 동시에 갱신되므로 모든 카운터는 원자 변수입니다.
#[derive(Debug, Default)]
pub struct Statistics {
    /// 매칭된 총 파일 수
    pub total_files: usize,
    /// 처리를 시도한 파일 수
    pub attempted: AtomicUsize,
    /// 이미 UTF-8 이라 건너뛴 수
    pub already_utf8: AtomicUsize,
    /// 변환 성공 수
    pub converted: AtomicUsize,
    /// 검사 모드에서 변환이 필요한 것으로 판정된 수
    pub pending: AtomicUsize,
    /// 에러 발생 수
    pub failed: AtomicUsize,
    /// 읽은 총 바이트
    pub total_bytes_read: AtomicU64,
    /// 쓴 총 바이트
    pub total_bytes_written: AtomicU64,
    /// 처리 시작 시간
    start_time: Option<Instant>,
}

impl Statistics {
    /// 새 통계 인스턴스 생성
    pub fn new(total_files: usize) -> Self {
        Self {
            total_files,
            start_time: Some(Instant::now()),
            ..Default::default()
        }
    }

    pub fn increment_attempted(&self) {
        self.attempted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_already_utf8(&self) {
        self.already_utf8.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_converted(&self) {
        self.converted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_pending(&self) {
        self.pending.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// 처리 시도 수 반환
    pub fn get_attempted(&self) -> usize {
        self.attempted.load(Ordering::Relaxed)
    }

    /// 모든 파일을 시도하기 전에 멈췄는지 여부
    pub fn is_incomplete(&self) -> bool {
        self.get_attempted() < self.total_files
    }

    /// 읽은 바이트 추가
    pub fn add_bytes_read(&self, bytes: u64) {
        self.total_bytes_read.fetch_add(bytes, Ordering::Relaxed);
    }

    /// 쓴 바이트 추가
    pub fn add_bytes_written(&self, bytes: u64) {
        self.total_bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    /// 경과 시간 반환
    pub fn elapsed(&self) -> Duration {
        self.start_time
            .map(|t| t.elapsed())
            .unwrap_or(Duration::ZERO)
    }

    /// 현재 카운터로 실행 요약 생성
    pub fn summary(&self, cancelled: bool) -> RunSummary {
        RunSummary {
            total: self.total_files,
            attempted: self.get_attempted(),
            already_utf8: self.already_utf8.load(Ordering::Relaxed),
            converted: self.converted.load(Ordering::Relaxed),
            pending: self.pending.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            bytes_read: self.total_bytes_read.load(Ordering::Relaxed),
            bytes_written: self.total_bytes_written.load(Ordering::Relaxed),
            cancelled,
            elapsed_ms: self.elapsed().as_millis() as u64,
        }
    }
}

/// 한 번의 실행 요약
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// 매칭된 총 파일 수
    pub total: usize,
    /// 처리를 시도한 파일 수 (취소되지 않았다면 `total`과 같음)
    pub attempted: usize,
    pub already_utf8: usize,
    pub converted: usize,
    pub pending: usize,
    pub failed: usize,
    pub bytes_read: u64,
    pub bytes_written: u64,
    /// 중간에 취소되었는지 여부
    pub cancelled: bool,
    pub elapsed_ms: u64,
}

impl RunSummary {
    /// 에러 없이 처리된 파일 수
    pub fn succeeded(&self) -> usize {
        self.already_utf8 + self.converted + self.pending
    }

    /// 통계 요약 출력
    pub fn print(&self) {
        println!("\n{}", "═".repeat(50).bright_blue());
        println!("{}", " 📊 처리 통계".bright_white().bold());
        println!("{}", "═".repeat(50).bright_blue());

        println!("  {} 전체 파일:    {}", "📁".bright_cyan(), self.total);
        println!("  {} 처리 시도:    {}", "🔄".bright_white(), self.attempted);
        println!(
            "  {} 이미 UTF-8:   {}",
            "✅".bright_green(),
            self.already_utf8.to_string().green()
        );
        println!(
            "  {} 변환 완료:    {}",
            "✨".bright_magenta(),
            self.converted.to_string().green()
        );

        if self.pending > 0 {
            println!(
                "  {} 변환 필요:    {}",
                "🔍".bright_yellow(),
                self.pending.to_string().yellow()
            );
        }

        if self.failed > 0 {
            println!(
                "  {} 실패:         {}",
                "❌".bright_red(),
                self.failed.to_string().red()
            );
        } else {
            println!("  {} 실패:         {}", "✅".bright_green(), "0".green());
        }

        println!(
            "  {} 입력 용량:    {}",
            "📥".bright_yellow(),
            format_bytes(self.bytes_read)
        );
        println!(
            "  {} 출력 용량:    {}",
            "📤".bright_magenta(),
            format_bytes(self.bytes_written)
        );

        if self.total > 0 {
            let success_rate = (self.succeeded() as f64 / self.total as f64) * 100.0;
            println!("  {} 성공률:       {:.1}%", "📈".bright_white(), success_rate);
        }

        println!(
            "  {} 처리 시간:    {}",
            "⏱️".bright_cyan(),
            format_duration(Duration::from_millis(self.elapsed_ms))
        );

        if self.cancelled {
            println!("  {} {}", "⚠️".bright_yellow(), "사용자에 의해 중단됨".yellow());
        }

        println!("{}", "═".repeat(50).bright_blue());
    }
}

/// 바이트를 읽기 쉬운 형식으로 변환
///
/// # Examples
/// ```
/// use utf8ify::stats::format_bytes;
///
/// assert_eq!(format_bytes(500), "500 B");
/// assert_eq!(format_bytes(1024), "1.00 KB");
/// assert_eq!(format_bytes(1048576), "1.00 MB");
/// ```
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// 경과 시간을 읽기 쉬운 형식으로 변환
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let millis = duration.subsec_millis();

    if secs >= 3600 {
        let hours = secs / 3600;
        let mins = (secs % 3600) / 60;
        format!("{}시간 {}분", hours, mins)
    } else if secs >= 60 {
        let mins = secs / 60;
        let remaining_secs = secs % 60;
        format!("{}분 {}초", mins, remaining_secs)
    } else if secs > 0 {
        format!("{}.{:03}초", secs, millis)
    } else {
        format!("{}ms", millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0 B");
        assert_eq!(format_bytes(1023), "1023 B");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(1073741824), "1.00 GB");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(500)), "500ms");
        assert_eq!(format_duration(Duration::from_secs(5)), "5.000초");
        assert_eq!(format_duration(Duration::from_secs(65)), "1분 5초");
        assert_eq!(format_duration(Duration::from_secs(3665)), "1시간 1분");
    }

    #[test]
    fn test_summary_snapshot() {
        let stats = Statistics::new(4);

        for _ in 0..4 {
            stats.increment_attempted();
        }
        stats.increment_already_utf8();
        stats.increment_converted();
        stats.increment_converted();
        stats.increment_failed();
        stats.add_bytes_read(2048);
        stats.add_bytes_written(1024);

        assert_eq!(stats.get_attempted(), 4);
        assert!(!stats.is_incomplete());

        let summary = stats.summary(false);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.attempted, 4);
        assert_eq!(summary.already_utf8, 1);
        assert_eq!(summary.converted, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.succeeded(), 3);
        assert_eq!(summary.bytes_read, 2048);
        assert_eq!(summary.bytes_written, 1024);
        assert!(!summary.cancelled);
    }

    #[test]
    fn test_summary_serializes_to_json() {
        let summary = RunSummary {
            total: 2,
            attempted: 2,
            converted: 1,
            failed: 1,
            ..Default::default()
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["total"], 2);
        assert_eq!(json["converted"], 1);
        assert_eq!(json["cancelled"], false);
    }
}
