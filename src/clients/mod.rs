pub mod open_meteo;
