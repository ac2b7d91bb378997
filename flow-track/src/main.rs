//! Track keypoints between two frames

use anyhow::Context;
use clap::*;
use log::*;
use pyrlk::prelude::v1::{Result, *};
use std::fs::File;

fn load_frame(path: &str) -> Result<Plane<u8>> {
    let image = image::open(path)
        .with_context(|| format!("Failed to open {path}"))?
        .to_luma8();
    let (width, height) = image.dimensions();
    Plane::from_vec(width as usize, height as usize, image.into_raw())
}

fn load_points(path: &str) -> Result<Vec<Keypoint>> {
    let file = File::open(path).with_context(|| format!("Failed to open {path}"))?;
    csv::Reader::from_reader(file)
        .deserialize()
        .map(|v| v.map_err(<_>::into))
        .collect::<Result<Vec<Keypoint>>>()
}

fn save_points(path: &str, points: &[Keypoint]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {path}"))?;
    let mut writer = csv::Writer::from_writer(file);
    for point in points {
        writer.serialize(point)?;
    }
    writer.flush()?;
    Ok(())
}

fn run(matches: &ArgMatches) -> Result<()> {
    let old = matches.value_of("old").unwrap();
    let new = matches.value_of("new").unwrap();
    let points = matches.value_of("points").unwrap();
    let output = matches.value_of("output").unwrap();
    let num_levels: usize = matches.value_of("levels").unwrap().parse()?;
    let mode: BorderMode = matches.value_of("border").unwrap().parse()?;
    let constant_value: u8 = matches.value_of("border-value").unwrap().parse()?;

    let mut params = if let Some(config) = matches.value_of("config") {
        let file = File::open(config).with_context(|| format!("Failed to open {config}"))?;
        serde_json::from_reader(file)?
    } else {
        OpticalFlowParameters::default()
    };

    let estimates = if let Some(estimates) = matches.value_of("estimates") {
        params = params.use_initial_estimate(true);
        load_points(estimates)?
    } else {
        vec![]
    };

    let lk = PyramidalLk::new(
        params,
        num_levels,
        Border {
            mode,
            constant_value,
        },
    );

    debug!("{lk:?}");

    let old_image = load_frame(old)?;
    let new_image = load_frame(new)?;
    let old_points = load_points(points)?;

    let tracked = lk.flow(&old_image, &new_image, &old_points, &estimates)?;

    info!(
        "Tracked {} of {} keypoints",
        tracked.iter().filter(|p| p.is_tracked()).count(),
        tracked.len()
    );

    save_points(output, &tracked)
}

fn main() -> Result<()> {
    env_logger::init();

    let matches = Command::new("flow-track")
        .version(crate_version!())
        .author(crate_authors!())
        .arg(
            Arg::new("old")
                .long("old")
                .short('o')
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::new("new")
                .long("new")
                .short('n')
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::new("points")
                .long("points")
                .short('p')
                .takes_value(true)
                .required(true),
        )
        .arg(
            Arg::new("estimates")
                .long("estimates")
                .short('e')
                .takes_value(true)
                .required(false),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .takes_value(true)
                .required(false),
        )
        .arg(
            Arg::new("levels")
                .long("levels")
                .short('l')
                .takes_value(true)
                .default_value("3"),
        )
        .arg(
            Arg::new("border")
                .long("border")
                .short('b')
                .takes_value(true)
                .possible_values(["undefined", "constant", "replicate"])
                .default_value("undefined"),
        )
        .arg(
            Arg::new("border-value")
                .long("border-value")
                .takes_value(true)
                .default_value("0"),
        )
        .arg(Arg::new("output").takes_value(true).required(true))
        .get_matches();

    run(&matches).map_err(|e| {
        error!("{e:?}");
        e
    })
}
