//! utf8ify - UTF-8 FOLDER CONVERTER
//!
//! 메인 엔트리포인트

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use utf8ify::{
    cli::{Args, Cli, Command},
    pattern::{collect_files, PatternMatcher},
    pipeline::{convert_files, CancelToken, ConvertOptions},
    render::ConsoleRenderer,
    stats::RunSummary,
};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Convert(args) => run_convert(&args),
    }
}

/// 로거 초기화 (`RUST_LOG` 가 있으면 우선)
fn setup_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

/// `convert` 명령 실행
fn run_convert(args: &Args) -> Result<()> {
    setup_logging(args.verbose);

    // 전제 조건 검사 (파일을 건드리기 전)
    let patterns = args.validate()?;

    print_header(args, &patterns);

    let matcher = PatternMatcher::new(&patterns)?;
    let files = collect_files(&args.folder, &matcher, args.max_depth)?;

    println!(
        "  {} 발견된 파일 수: {}",
        "📋".bright_white(),
        files.len().to_string().bright_green()
    );

    if args.dry_run {
        print_dry_run(&files);
        return Ok(());
    }

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || handler_token.cancel()).context("Ctrl+C 핸들러 설정 실패")?;

    let options = ConvertOptions::new()
        .with_threads(args.threads)
        .with_check_only(args.check)
        .with_max_depth(args.max_depth)
        .with_cancel(cancel);

    println!("\n{}", "⚡ 변환 중...".bright_cyan());

    let renderer = ConsoleRenderer::new(files.len(), args.verbose);
    let summary = convert_files(&files, &args.encoding, &renderer, &options)?;
    renderer.finish();

    let errors = renderer.errors();
    if let Some(ref log_path) = args.log {
        write_error_log(log_path, &errors)?;
    }

    if let Some(ref report_path) = args.report {
        write_report(report_path, &summary)?;
    }

    summary.print();

    if summary.failed == 0 {
        println!("\n{} 모든 파일 처리가 끝났습니다!\n", "✅".bright_green());
    } else {
        println!(
            "\n{} {} 개의 파일에 오류가 있습니다.\n",
            "⚠️".bright_yellow(),
            summary.failed.to_string().red()
        );
    }

    Ok(())
}

/// 헤더 출력
fn print_header(args: &Args, patterns: &[String]) {
    println!("\n{}", "═".repeat(50).bright_blue());
    println!("{}", " 🚀 UTF-8 FOLDER CONVERTER".bright_white().bold());
    println!("{}", "═".repeat(50).bright_blue());
    println!("  {} 대상 폴더: {:?}", "📂".bright_cyan(), args.folder);
    println!("  {} 패턴: {}", "🔍".bright_magenta(), patterns.join(", "));
    println!("  {} 원본 인코딩: {}", "🔤".bright_yellow(), args.encoding);

    if args.threads > 1 {
        println!("  {} 스레드 수: {}", "🧵".bright_white(), args.threads);
    }

    if let Some(depth) = args.max_depth {
        println!("  {} 최대 깊이: {}", "📏".bright_white(), depth);
    }

    if args.dry_run {
        println!(
            "  {} {}",
            "⚠️".bright_yellow(),
            "드라이런 모드 (실제 변환 없음)".yellow()
        );
    }

    if args.check {
        println!("  {} {}", "🔍".bright_cyan(), "검사 모드 (파일 쓰기 없음)".cyan());
    }

    println!("{}", "═".repeat(50).bright_blue());
    println!("\n{}", "📁 파일 검색 중...".bright_cyan());
}

/// 드라이런 출력
fn print_dry_run(files: &[PathBuf]) {
    println!("\n{}", "📋 처리 예정 파일 목록:".bright_cyan());
    for (i, path) in files.iter().enumerate() {
        println!("  {}. {}", i + 1, path.display());
    }
    println!(
        "\n{} 총 {} 개의 파일이 처리될 예정입니다.",
        "ℹ️".bright_blue(),
        files.len().to_string().bright_green()
    );
}

/// 에러 로그 파일 작성
fn write_error_log(log_path: &Path, errors: &[String]) -> Result<()> {
    let mut log_file = File::create(log_path)
        .with_context(|| format!("에러 로그 파일 생성 실패: {:?}", log_path))?;

    writeln!(log_file, "utf8ify 에러 로그")?;
    writeln!(log_file, "생성 시간: {}", unix_now())?;
    writeln!(log_file, "총 에러 수: {}", errors.len())?;
    writeln!(log_file, "{}", "=".repeat(50))?;

    for error in errors {
        writeln!(log_file, "\n{}", error)?;
    }

    println!("\n{} 에러 로그 저장: {:?}", "📝".bright_cyan(), log_path);

    Ok(())
}

/// 실행 요약 JSON 작성
fn write_report(report_path: &Path, summary: &RunSummary) -> Result<()> {
    let file = File::create(report_path)
        .with_context(|| format!("리포트 파일 생성 실패: {:?}", report_path))?;
    serde_json::to_writer_pretty(file, summary).context("리포트 직렬화 실패")?;

    println!("\n{} 리포트 저장: {:?}", "📝".bright_cyan(), report_path);

    Ok(())
}

/// 현재 시간 문자열 반환
fn unix_now() -> String {
    use std::time::SystemTime;
    let now = SystemTime::now();
    let duration = now
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default();
    format!("Unix timestamp: {}", duration.as_secs())
}
