#![allow(dead_code)]

use covid_dash::data::loader::parse_csv;
use covid_dash::data::model::CovidData;
use covid_dash::data::schema::TableSchema;
use covid_dash::Dashboard;

pub const HISTORICAL_CSV: &str = "\
iso_code,continent,location,date,new_cases,new_cases_smoothed,total_cases,icu_patients_per_million,total_vaccinations_per_hundred,total_deaths_per_million
FRA,Europe,France,2021-01-02,120,105.5,220,3.1,,10.2
FRA,Europe,France,2021-01-01,100,,100,2.9,,10.0
DEU,Europe,Germany,2021-01-01,90,,90,,,5.0
DEU,Europe,Germany,2021-01-02,80,85.0,170,,0.5,5.1
JPN,Asia,Japan,2021-01-03,10,9.5,10,,,0.1
OWID_WRL,,World,2021-01-03,300,280.0,490,,,3.3
";

pub const LATEST_CSV: &str = "\
iso_code,continent,location,last_updated_date,total_cases,new_cases,new_cases_smoothed,gdp_per_capita
FRA,Europe,France,2021-01-02,220,120.0,105.5,38605.671
DEU,Europe,Germany,2021-01-02,170,80.0,85.0,45229.245
JPN,Asia,Japan,2021-01-03,10,10.0,9.5,39002.223
OWID_WRL,,World,2021-01-03,490,300.0,280.0,
";

pub fn data() -> CovidData {
    let historical = parse_csv("historical", HISTORICAL_CSV).unwrap();
    let latest = parse_csv("latest", LATEST_CSV).unwrap();
    TableSchema::historical().validate(&historical).unwrap();
    TableSchema::latest().validate(&latest).unwrap();
    CovidData { historical, latest }
}

pub fn dashboard() -> Dashboard {
    Dashboard::new(data()).unwrap()
}
