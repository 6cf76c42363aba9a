//! Read-only terrain and illumination rasters.
//!
//! Both formats are little-endian: a header of `i32` dimensions followed by a row-major payload.
//! The slope map holds one `f32` (degrees) per pixel, the shadow map one byte per pixel and
//! timestep (0 lit, 255 fully shadowed), indexed `t * w * h + y * w + x`.

use std::{fs::File, io::Read, path::Path};

use log::debug;
use roversim_structs::{GraphNode, WorldGrid};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MapError {
    #[error("could not read map: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid map header: {0}")]
    InvalidHeader(String),

    #[error("map payload truncated: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("map has {extra} bytes of trailing data after the payload")]
    TrailingData { extra: usize },

    #[error("{map} map is {actual}, world needs {expected}")]
    SizeMismatch { map: &'static str, expected: String, actual: String },

    #[error("maps use {actual} s per timestep, world needs {expected}")]
    TimestepMismatch { expected: f64, actual: f64 },
}

fn read_dims<const N: usize>(reader: &mut impl Read) -> Result<[usize; N], MapError> {
    let mut dims = [0usize; N];
    for d in dims.iter_mut() {
        let mut buf = [0u8; 4];
        reader.read_exact(&mut buf)?;
        let value = i32::from_le_bytes(buf);
        if value <= 0 {
            return Err(MapError::InvalidHeader(format!("dimension {} is not positive", value)));
        }
        *d = value as usize;
    }
    Ok(dims)
}

fn read_payload(reader: &mut impl Read, expected: usize) -> Result<Vec<u8>, MapError> {
    let mut payload = Vec::with_capacity(expected);
    reader.read_to_end(&mut payload)?;
    if payload.len() < expected {
        return Err(MapError::Truncated { expected, actual: payload.len() });
    }
    if payload.len() > expected {
        return Err(MapError::TrailingData { extra: payload.len() - expected });
    }
    Ok(payload)
}

fn checked_size(dims: &[usize], elem: usize) -> Result<usize, MapError> {
    dims.iter()
        .try_fold(elem, |acc, d| acc.checked_mul(*d))
        .ok_or_else(|| MapError::InvalidHeader(format!("dimensions {:?} overflow", dims)))
}

#[derive(Debug, Clone)]
pub struct SlopeMap {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl SlopeMap {
    /// Level terrain everywhere.
    pub fn flat(width: u32, height: u32) -> Self {
        let (width, height) = (width as usize, height as usize);
        Self { width, height, data: vec![0.0; width * height] }
    }

    pub fn from_data(width: u32, height: u32, data: Vec<f32>) -> Result<Self, MapError> {
        let (width, height) = (width as usize, height as usize);
        if data.len() != width * height {
            return Err(MapError::Truncated { expected: width * height * 4, actual: data.len() * 4 });
        }
        Ok(Self { width, height, data })
    }

    pub fn from_reader(mut reader: impl Read) -> Result<Self, MapError> {
        let [width, height] = read_dims::<2>(&mut reader)?;
        let payload = read_payload(&mut reader, checked_size(&[width, height], 4)?)?;
        let data = payload
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        debug!("Loaded slope map {}x{}", width, height);
        Ok(Self { width, height, data })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, MapError> {
        Self::from_reader(std::io::BufReader::new(File::open(path)?))
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Slope in degrees at a pixel. Callers floor world coordinates to the pixel first.
    pub fn at(&self, x: i64, y: i64) -> Option<f32> {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return None;
        }
        self.data.get(y as usize * self.width + x as usize).copied()
    }
}

#[derive(Debug, Clone)]
pub struct ShadowMap {
    width: usize,
    height: usize,
    timesteps: usize,
    data: Vec<u8>,
}

impl ShadowMap {
    /// Fully lit at all times.
    pub fn lit(width: u32, height: u32, timesteps: u32) -> Self {
        let (width, height, timesteps) = (width as usize, height as usize, timesteps as usize);
        Self { width, height, timesteps, data: vec![0; width * height * timesteps] }
    }

    pub fn from_data(width: u32, height: u32, timesteps: u32, data: Vec<u8>) -> Result<Self, MapError> {
        let (width, height, timesteps) = (width as usize, height as usize, timesteps as usize);
        let expected = width * height * timesteps;
        if data.len() != expected {
            return Err(MapError::Truncated { expected, actual: data.len() });
        }
        Ok(Self { width, height, timesteps, data })
    }

    pub fn from_reader(mut reader: impl Read) -> Result<Self, MapError> {
        let [width, height, timesteps] = read_dims::<3>(&mut reader)?;
        let data = read_payload(&mut reader, checked_size(&[width, height, timesteps], 1)?)?;
        debug!("Loaded shadow map {}x{}x{}", width, height, timesteps);
        Ok(Self { width, height, timesteps, data })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, MapError> {
        Self::from_reader(std::io::BufReader::new(File::open(path)?))
    }

    pub fn timesteps(&self) -> usize {
        self.timesteps
    }

    /// Callers floor x, y and t to the pixel and timestep first.
    pub fn at(&self, x: i64, y: i64, t: i64) -> Option<u8> {
        if x < 0 || y < 0 || t < 0 {
            return None;
        }
        let (x, y, t) = (x as usize, y as usize, t as usize);
        if x >= self.width || y >= self.height || t >= self.timesteps {
            return None;
        }
        self.data.get(t * self.width * self.height + y * self.width + x).copied()
    }
}

/// The cost surfaces the planner's speed model reads.
#[derive(Debug, Clone)]
pub struct Environment {
    pub slope: SlopeMap,
    pub shadow: ShadowMap,
    seconds_per_timestep: f64,
}

impl Environment {
    /// Maps must cover the world exactly in space and at least its horizon in time.
    pub fn new(slope: SlopeMap, shadow: ShadowMap, world: &WorldGrid) -> Result<Self, MapError> {
        let (w, h) = (world.width as usize, world.height as usize);
        if slope.width != w || slope.height != h {
            return Err(MapError::SizeMismatch {
                map: "slope",
                expected: format!("{}x{}", w, h),
                actual: format!("{}x{}", slope.width, slope.height),
            });
        }
        if shadow.width != w || shadow.height != h || shadow.timesteps < world.timesteps as usize {
            return Err(MapError::SizeMismatch {
                map: "shadow",
                expected: format!("{}x{}x{}", w, h, world.timesteps),
                actual: format!("{}x{}x{}", shadow.width, shadow.height, shadow.timesteps),
            });
        }
        Ok(Self { slope, shadow, seconds_per_timestep: world.seconds_per_timestep })
    }

    /// Flat, fully lit world.
    pub fn flat(world: &WorldGrid) -> Self {
        Self {
            slope: SlopeMap::flat(world.width, world.height),
            shadow: ShadowMap::lit(world.width, world.height, world.timesteps),
            seconds_per_timestep: world.seconds_per_timestep,
        }
    }

    pub fn seconds_per_timestep(&self) -> f64 {
        self.seconds_per_timestep
    }

    pub fn slope_at(&self, node: &GraphNode) -> Option<f32> {
        self.slope.at(node.position.x.floor() as i64, node.position.y.floor() as i64)
    }

    pub fn shadow_at(&self, node: &GraphNode) -> Option<u8> {
        if !(node.time >= 0.0) {
            return None;
        }
        let t = (node.time / self.seconds_per_timestep).floor() as i64;
        self.shadow.at(node.position.x.floor() as i64, node.position.y.floor() as i64, t)
    }
}
