use crate::shell::context::CommandContext;
use anyhow::{Context, Result, bail};
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Split `-abc` style flags from operands. `--` ends flag parsing and a lone
/// `-` is an operand (stdin).
pub fn split_flags(args: &[String]) -> (Vec<char>, Vec<String>) {
    let mut flags = Vec::new();
    let mut operands = Vec::new();
    let mut only_operands = false;

    for arg in args {
        if only_operands || arg == "-" || !arg.starts_with('-') {
            operands.push(arg.clone());
        } else if arg == "--" {
            only_operands = true;
        } else {
            flags.extend(arg.chars().skip(1));
        }
    }
    (flags, operands)
}

/// Pull the value of an `-n N` / `-nN` option out of `args`, leaving the
/// rest untouched.
pub fn take_count(args: &[String], flag: &str, default: usize) -> Result<(usize, Vec<String>)> {
    let mut count = default;
    let mut rest = Vec::new();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        if arg == flag {
            let Some(value) = iter.next() else {
                bail!("option {} requires a number", flag);
            };
            count = parse_count(value)?;
        } else if let Some(value) = arg.strip_prefix(flag) {
            count = parse_count(value)?;
        } else {
            rest.push(arg.clone());
        }
    }
    Ok((count, rest))
}

fn parse_count(value: &str) -> Result<usize> {
    value
        .parse::<usize>()
        .with_context(|| format!("invalid number: {}", value))
}

/// Readers for each named file, or the stage's stdin when none are given
/// (or for `-`).
pub fn open_inputs(ctx: &mut CommandContext<'_>, files: &[String]) -> Result<Vec<(String, Box<dyn BufRead + Send>)>> {
    if files.is_empty() {
        return Ok(vec![("-".to_string(), take_stdin(ctx))]);
    }

    let mut inputs = Vec::with_capacity(files.len());
    for name in files {
        if name == "-" {
            inputs.push((name.clone(), take_stdin(ctx)));
            continue;
        }
        let file = File::open(name).with_context(|| format!("{}: cannot open", name))?;
        inputs.push((name.clone(), Box::new(BufReader::new(file)) as Box<dyn BufRead + Send>));
    }
    Ok(inputs)
}

fn take_stdin(ctx: &mut CommandContext<'_>) -> Box<dyn BufRead + Send> {
    let stdin = std::mem::replace(&mut ctx.stdin, Box::new(io::empty()));
    Box::new(BufReader::new(stdin))
}

/// Read every line of every input, lossily decoded, without the trailing
/// newline.
pub fn read_lines(ctx: &mut CommandContext<'_>, files: &[String]) -> Result<Vec<String>> {
    let mut lines = Vec::new();
    for (_, reader) in open_inputs(ctx, files)? {
        for line in byte_lines(reader) {
            lines.push(line?);
        }
    }
    Ok(lines)
}

/// Like `BufRead::lines` but tolerant of invalid UTF-8.
pub fn byte_lines(reader: Box<dyn BufRead + Send>) -> impl Iterator<Item = io::Result<String>> {
    reader.split(b'\n').map(|chunk| {
        chunk.map(|mut bytes| {
            if bytes.last() == Some(&b'\r') {
                bytes.pop();
            }
            String::from_utf8_lossy(&bytes).into_owned()
        })
    })
}

pub fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<()> {
    if !dst.exists() {
        fs::create_dir_all(dst)?;
    }

    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let ty = entry.file_type()?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if ty.is_dir() {
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}
