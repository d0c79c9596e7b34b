use anyhow::{Context, Result};
use log::debug;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use couchdb_query_builder::command::{Outcome, HELP};
use couchdb_query_builder::config::{BuilderConfig, DEFAULT_CONFIG_FILE};
use couchdb_query_builder::parser::parse_line;
use couchdb_query_builder::QueryBuilder;

/// 加载配置，失败时使用默认配置
fn load_config() -> BuilderConfig {
    match BuilderConfig::from_json_file(DEFAULT_CONFIG_FILE) {
        Ok(config) => {
            println!("✅ 成功从JSON配置文件加载: {}", DEFAULT_CONFIG_FILE);
            println!("  docTypeField: {}", config.doc_type_field);
            if let Some(doc_type) = &config.default_doc_type {
                println!("  defaultDocType: {}", doc_type);
            }
            if let Some(limit) = config.default_limit {
                println!("  defaultLimit: {}", limit);
            }
            config
        }
        Err(e) => {
            println!("⚠️ 无法加载JSON配置文件 ({}), 使用默认配置", e);
            BuilderConfig::default()
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    println!("--- CouchDB Query Builder ---");
    println!("\n[配置信息]:");
    let config = load_config();
    let mut builder = QueryBuilder::from_config(&config);

    println!("\n{}\n", HELP);

    let mut editor = DefaultEditor::new().context("无法初始化命令行编辑器")?;

    loop {
        let line = match editor.readline("query> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e).context("读取输入失败"),
        };

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        editor.add_history_entry(input)?;

        let command = match parse_line(input) {
            Ok(command) => command,
            Err(e) => {
                println!("✗ 解析失败: {}", e);
                continue;
            }
        };
        debug!("parsed command: {:?}", command);

        match command.apply(&mut builder) {
            Ok(Outcome::Updated) => {}
            Ok(Outcome::Output(text)) => println!("{}", text),
            Ok(Outcome::Exit) => break,
            Err(e) => println!("✗ {}", e),
        }
    }

    println!("再见");
    Ok(())
}
