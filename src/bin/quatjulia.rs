// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use clap::{App, Arg, ArgMatches};
use failure::{format_err, Error};
use log::info;
use std::str::FromStr;
use std::time::Instant;

use quatjulia::{Animator, HeadlessSurface, RenderConfig};

fn parse_pair<T>(s: &str, separator: char) -> Option<(T, T)>
where
    T: FromStr,
{
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + Ord>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

const SIZE: &str = "size";
const SAMPLES: &str = "samples";
const THREADS: &str = "threads";
const FRAMES: &str = "frames";
const FPS: &str = "fps";

fn args<'a>(max_threads: usize, default_threads: &'a str) -> ArgMatches<'a> {
    App::new("quatjulia")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Morphing quaternion Julia set, rendered headless")
        .arg(
            Arg::with_name(SIZE)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("800x450")
                .validator(|s| validate_pair::<u16>(&s, 'x', "Could not parse image size"))
                .help("Size of the rendered image"),
        )
        .arg(
            Arg::with_name(SAMPLES)
                .long(SAMPLES)
                .short("a")
                .takes_value(true)
                .default_value("2")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        8,
                        "Could not parse sample count",
                        "Sample count must be between 1 and 8",
                    )
                })
                .help("Antialiasing samples per axis"),
        )
        .arg(
            Arg::with_name(THREADS)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .default_value(default_threads)
                .validator(move |s| {
                    validate_range(
                        &s,
                        1,
                        max_threads,
                        "Could not parse thread count",
                        &format!("Thread count must be between 1 and {}", max_threads),
                    )
                })
                .help("Number of threads to render with"),
        )
        .arg(
            Arg::with_name(FRAMES)
                .long(FRAMES)
                .short("f")
                .takes_value(true)
                .default_value("120")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        u64::max_value(),
                        "Could not parse frame count",
                        "Frame count must be at least 1",
                    )
                })
                .help("Number of frames to render before exiting"),
        )
        .arg(
            Arg::with_name(FPS)
                .long(FPS)
                .takes_value(true)
                .default_value("60")
                .validator(|s| {
                    validate_range(
                        &s,
                        0,
                        1000,
                        "Could not parse frame rate",
                        "Frame rate must be between 0 and 1000",
                    )
                })
                .help("Target frame rate; 0 renders as fast as possible"),
        )
        .get_matches()
}

fn value<T: FromStr>(matches: &ArgMatches, name: &str) -> Result<T, Error> {
    matches
        .value_of(name)
        .and_then(|s| T::from_str(s).ok())
        .ok_or_else(|| format_err!("Could not parse --{}", name))
}

fn run(matches: &ArgMatches) -> Result<(), Error> {
    let (width, height) = matches
        .value_of(SIZE)
        .and_then(|s| parse_pair::<usize>(s, 'x'))
        .ok_or_else(|| format_err!("Could not parse image size"))?;
    let samples: usize = value(matches, SAMPLES)?;
    let threads: usize = value(matches, THREADS)?;
    let frames: u64 = value(matches, FRAMES)?;
    let fps: u32 = value(matches, FPS)?;

    let config = RenderConfig {
        samples,
        ..RenderConfig::with_size(width, height)
    };
    let mut animator = Animator::new(config, threads)?;
    let mut surface = HeadlessSurface::new(frames, fps);

    info!("processing: crossbeam ({} threads, CPU f64)", threads);
    let started = Instant::now();
    let rendered = animator.run(&mut surface)?;
    let elapsed = started.elapsed();

    println!("frames: {}", rendered);
    println!("size: {}x{}", width, height);
    println!("samples: {}x{}", samples, samples);
    println!("threads: {}", threads);
    println!("elapsed: {:.3}s", elapsed.as_secs_f64());
    println!(
        "mean frame: {:.2}ms",
        elapsed.as_secs_f64() * 1000.0 / rendered.max(1) as f64
    );
    println!("checksum: {:016x}", surface.checksum());
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let max_threads = num_cpus::get();
    let default_threads = max_threads.to_string();
    let matches = args(max_threads, &default_threads);
    if let Err(e) = run(&matches) {
        eprintln!("Render failure: {}", e);
        std::process::exit(1);
    }
}
