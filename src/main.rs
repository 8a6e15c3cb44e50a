use jclassfile::jvm::class_file::{ClassFile, Exceptions, SourceFile};
use jclassfile::jvm::Error;

use clap::{value_parser, Arg, ArgAction, Command};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::process;

fn main() -> Result<(), Error> {
    env_logger::init();

    let matches = Command::new("Class file round-tripper")
        .version(clap::crate_version!())
        .about("Parse, inspect, edit, and re-encode JVM class files")
        .arg(
            Arg::new("dump")
                .long("dump")
                .action(ArgAction::SetTrue)
                .help("Print the header, constant pool, and members of the class"),
        )
        .arg(
            Arg::new("verify")
                .long("verify")
                .action(ArgAction::SetTrue)
                .help("Check that re-encoding the class gives back the input bytes"),
        )
        .arg(
            Arg::new("source-file")
                .long("set-source-file")
                .value_name("NAME")
                .help("Rewrite the name recorded in the `SourceFile` attribute"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("Write the (possibly edited) class to this file"),
        )
        .arg(
            Arg::new("INPUT")
                .help("Sets the input class file to use")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .index(1),
        )
        .get_matches();

    let input = matches
        .get_one::<PathBuf>("INPUT")
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "missing input class"))?;
    log::info!("Reading '{}'", input.display());
    let input_bytes = fs::read(input)?;
    let mut class = ClassFile::parse(&input_bytes)?;

    if matches.get_flag("verify") {
        let output_bytes = class.encode()?;
        if output_bytes != input_bytes {
            let mismatch = output_bytes
                .iter()
                .zip(&input_bytes)
                .position(|(a, b)| a != b)
                .unwrap_or_else(|| output_bytes.len().min(input_bytes.len()));
            log::error!(
                "Re-encoded class differs from '{}' starting at byte {} ({} bytes vs {} bytes)",
                input.display(),
                mismatch,
                output_bytes.len(),
                input_bytes.len()
            );
            process::exit(1);
        }
        log::info!("Re-encoded {} bytes identically", output_bytes.len());
    }

    if let Some(name) = matches.get_one::<String>("source-file") {
        match class.get_attribute::<SourceFile>()? {
            Some(source_file) => {
                log::info!(
                    "Renaming source file '{}' to '{}'",
                    source_file.source_file(&class.constant_pool)?,
                    name
                );
                source_file.set_source_file(&mut class.constant_pool, name)?;
            }
            None => {
                log::error!("'{}' has no SourceFile attribute", input.display());
                process::exit(1);
            }
        }
    }

    if matches.get_flag("dump") {
        dump(&class)?;
    }

    if let Some(output) = matches.get_one::<PathBuf>("output") {
        log::info!("Writing '{}'", output.display());
        class.save_to_path(output, true)?;
    }

    Ok(())
}

/// Print a `javap`-like summary of the class
fn dump(class: &ClassFile) -> Result<(), Error> {
    let version = class.version;
    println!("class {}", class.this_class_name()?);
    match version.java_release() {
        Some(release) => println!("  version: {} (Java {})", version, release),
        None => println!("  version: {}", version),
    }
    println!("  flags: {:?}", class.access_flags);
    if let Some(super_class) = class.super_class_name()? {
        println!("  super: {}", super_class);
    }
    for interface in class.interface_names()? {
        println!("  implements: {}", interface);
    }

    println!("Constant pool ({} slots):", class.constant_pool.count());
    print!("{}", class.constant_pool);

    let constants = &class.constant_pool;
    println!("Fields:");
    for field in &class.fields {
        println!(
            "  {} {} ({:?})",
            field.name(constants)?,
            field.descriptor(constants)?,
            field.access_flags
        );
    }

    println!("Methods:");
    for method in &class.methods {
        println!(
            "  {}{} ({:?})",
            method.name(constants)?,
            method.descriptor(constants)?,
            method.access_flags
        );
        if let Some(exceptions) = method.get_attribute::<Exceptions>(constants)? {
            println!(
                "    throws {}",
                exceptions.exception_names(constants)?.join(", ")
            );
        }
    }

    println!("Attributes: {}", class.get_attribute_names()?.join(", "));
    Ok(())
}
