// Copyright (c) Facebook, Inc. and its affiliates.
use anyhow::{Context, Result};
use clap;
use log::info;
use serde::{de::DeserializeOwned, Serialize};
use serde_json;
use std::default::Default;
use std::fs;
use std::io::{self, prelude::*};
use std::path::{Path, PathBuf};

// Result and args files may start with a block of "//" or "#" comments.
// They're kept as the preamble and blanked out of the body so that line
// numbers in parse errors stay accurate.
fn read_json<P: AsRef<Path>>(path: P) -> Result<(String, String)> {
    let mut f = fs::OpenOptions::new().read(true).open(path)?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;

    let mut preamble = String::new();
    let mut body = String::new();
    let mut seen_body = false;

    for line in buf.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("//") || trimmed.starts_with("#") {
            if !seen_body {
                preamble = preamble + line + "\n";
            }
            body = body + "\n";
        } else {
            seen_body = true;
            body = body + line + "\n"
        }
    }
    Ok((preamble, body))
}

pub trait JsonLoad
where
    Self: DeserializeOwned,
{
    fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let (_, body) = read_json(path).with_context(|| format!("Reading {:?}", path))?;
        serde_json::from_str::<Self>(&body).with_context(|| format!("Parsing {:?}", path))
    }
}

pub trait JsonSave
where
    Self: Default + Serialize,
{
    fn preamble() -> Option<String> {
        None
    }

    fn maybe_create_dfl<P: AsRef<Path>>(path_in: P) -> Result<bool> {
        let path = path_in.as_ref();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(&parent)?;
        }

        match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
        {
            Ok(mut f) => {
                let data: Self = Default::default();
                f.write_all(data.as_json()?.as_ref())?;
                Ok(true)
            }
            Err(e) => match e.kind() {
                io::ErrorKind::AlreadyExists => Ok(false),
                _ => Err(e.into()),
            },
        }
    }

    fn as_json(&self) -> Result<String> {
        let mut serialized = serde_json::to_string_pretty(&self)?;
        if !serialized.ends_with("\n") {
            serialized += "\n";
        }
        match Self::preamble() {
            Some(pre) => Ok(pre + &serialized),
            None => Ok(serialized),
        }
    }

    fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut f = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;
        f.write_all(self.as_json()?.as_ref())?;
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub struct JsonConfigFile<T: JsonLoad + JsonSave> {
    pub path: Option<PathBuf>,
    pub data: T,
}

impl<T: JsonLoad + JsonSave> JsonConfigFile<T> {
    pub fn load<P: AsRef<Path>>(path_in: P) -> Result<Self> {
        let path = path_in.as_ref();
        Ok(Self {
            path: Some(PathBuf::from(path)),
            data: T::load(path)?,
        })
    }

    pub fn load_or_create<P: AsRef<Path>>(path_opt: Option<P>) -> Result<Self> {
        match path_opt {
            Some(path_in) => {
                let path = path_in.as_ref();

                if T::maybe_create_dfl(path)? {
                    info!("cfg: Created {:?}", path);
                }

                Self::load(path)
            }
            None => Ok(Self {
                path: None,
                data: Default::default(),
            }),
        }
    }

    pub fn save(&self) -> Result<()> {
        match self.path.as_deref() {
            Some(path) => self.data.save(path),
            None => Ok(()),
        }
    }
}

pub trait JsonArgs
where
    Self: JsonLoad + JsonSave,
{
    fn match_cmdline() -> clap::ArgMatches<'static>;
    fn verbosity(matches: &clap::ArgMatches) -> u32;
    fn process_cmdline(&mut self, matches: &clap::ArgMatches) -> Result<bool>;
}

pub trait JsonArgsHelper
where
    Self: JsonArgs,
{
    fn init_args_and_logging_nosave() -> Result<(JsonConfigFile<Self>, bool)>;
    fn save_args(args_file: &JsonConfigFile<Self>) -> Result<()>;
    fn init_args_and_logging() -> Result<JsonConfigFile<Self>>;
}

impl<T> JsonArgsHelper for T
where
    T: JsonArgs,
{
    fn init_args_and_logging_nosave() -> Result<(JsonConfigFile<T>, bool)> {
        let matches = T::match_cmdline();
        super::init_logging(T::verbosity(&matches));

        let mut args_file = JsonConfigFile::<T>::load_or_create(matches.value_of("args"))?;
        let updated = args_file.data.process_cmdline(&matches)?;

        Ok((args_file, updated))
    }

    fn save_args(args_file: &JsonConfigFile<T>) -> Result<()> {
        if let Some(path) = args_file.path.as_deref() {
            info!("Updating command line arguments file {:?}", path);
            args_file.save()?;
        }
        Ok(())
    }

    fn init_args_and_logging() -> Result<JsonConfigFile<T>> {
        let (args_file, updated) = Self::init_args_and_logging_nosave()?;
        if updated {
            Self::save_args(&args_file)?;
        }
        Ok(args_file)
    }
}

#[cfg(test)]
mod tests {
    use super::{JsonConfigFile, JsonLoad, JsonSave};
    use serde::{Deserialize, Serialize};
    use std::fs;

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    #[serde(default)]
    struct Knobs {
        name: String,
        count: u32,
    }

    impl JsonLoad for Knobs {}
    impl JsonSave for Knobs {
        fn preamble() -> Option<String> {
            Some("// test knobs\n".into())
        }
    }

    #[test]
    fn test_preamble_is_skipped_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("knobs.json");

        let knobs = Knobs {
            name: "tcp".into(),
            count: 3,
        };
        knobs.save(&path).unwrap();
        assert!(fs::read_to_string(&path)
            .unwrap()
            .starts_with("// test knobs\n{"));

        assert_eq!(Knobs::load(&path).unwrap(), knobs);
    }

    #[test]
    fn test_load_or_create() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("args.json");

        let cfg = JsonConfigFile::<Knobs>::load_or_create(Some(&path)).unwrap();
        assert!(path.exists());
        assert_eq!(cfg.data, Knobs::default());

        let cfg = JsonConfigFile::<Knobs>::load_or_create(None::<&str>).unwrap();
        assert!(cfg.path.is_none());
        cfg.save().unwrap();
    }

    #[test]
    fn test_parse_error_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "# comment\n{ \"count\": \"three\" }\n").unwrap();

        let err = Knobs::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("broken.json"));
    }
}
