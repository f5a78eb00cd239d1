//! Numeric config fields that also accept their value written as a string,
//! e.g. `fleet_port: "8080"` or a `${VAR}` placeholder resolved to text.

use serde::de::{Deserialize, Deserializer, Error};
use std::fmt::Display;
use std::str::FromStr;

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum NumberOrText<T> {
    Number(T),
    Text(String),
}

fn resolve<T, E>(value: NumberOrText<T>) -> Result<T, E>
where
    T: FromStr,
    T::Err: Display,
    E: Error,
{
    match value {
        NumberOrText::Number(number) => Ok(number),
        NumberOrText::Text(raw) => raw
            .trim()
            .parse()
            .map_err(|e| E::custom(format!("invalid number '{}': {}", raw, e))),
    }
}

pub fn number<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: Display,
{
    resolve(NumberOrText::deserialize(deserializer)?)
}

pub fn option_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: Display,
{
    Option::<NumberOrText<T>>::deserialize(deserializer)?
        .map(resolve::<T, D::Error>)
        .transpose()
}
