extern crate chrono;
use chrono::prelude::*;

extern crate ee_core;
use ee_core::cpu::decode;
use ee_core::tools;

extern crate clap;
use clap::{App, Arg};

fn main() {
    env_logger::init();

    let matches = App::new("ee-disasm")
        .version("0.1")
        .arg(
            Arg::with_name("INPUT")
                .help("Sets the raw little-endian MIPS word stream to disassemble")
                .required(true)
                .index(1),
        )
        .arg(Arg::with_name("timestamp").long("timestamp").help("Include a timestamp in the output"))
        .get_matches();

    let filename = matches.value_of("INPUT").unwrap();
    println!("; Source {}", filename);
    if matches.is_present("timestamp") {
        // disabled by default for reproducibility
        println!("; Generated {}", Local::now().to_rfc2822());
    }
    println!();

    flat_disassembly(filename);
}

fn flat_disassembly(filename: &str) {
    let data = match tools::read_binary(filename) {
        Ok(data) => data,
        Err(err) => panic!("failed to read {}: {}", filename, err),
    };

    let mut pc = 0u32;
    for chunk in data.chunks(4) {
        if chunk.len() < 4 {
            log::warn!("ee-disasm: {} trailing bytes ignored at end of file", chunk.len());
            break;
        }
        let word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        let instr = decode(word, pc);
        println!("{:08x}: {:08x}  {}", pc, word, instr);
        pc = pc.wrapping_add(4);
    }
}
