//! Schema command - print expected input formats

use crate::core::{Column, RateSchedule};
use clap::Args;
use schemars::schema_for;

#[derive(Args, Debug)]
pub struct SchemaCommand {
    /// Output format: json-schema (rules file), csv-header or csv-fields
    #[arg(value_enum, default_value = "csv-fields")]
    format: SchemaFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SchemaFormat {
    /// JSON Schema for the rate schedule file
    JsonSchema,
    /// CSV header row with column names
    CsvHeader,
    /// CSV column descriptions
    CsvFields,
}

impl SchemaCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        match self.format {
            SchemaFormat::JsonSchema => self.print_json_schema(),
            SchemaFormat::CsvHeader => self.print_csv_header(),
            SchemaFormat::CsvFields => self.print_csv_fields(),
        }
    }

    fn print_json_schema(&self) -> anyhow::Result<()> {
        let schema = schema_for!(RateSchedule);
        println!("{}", serde_json::to_string_pretty(&schema)?);
        Ok(())
    }

    fn print_csv_header(&self) -> anyhow::Result<()> {
        let headers: Vec<&str> = Column::ALL.iter().map(|c| c.header()).collect();
        println!("{}", headers.join(","));
        Ok(())
    }

    fn print_csv_fields(&self) -> anyhow::Result<()> {
        println!("Input Format (CSV, XLSX or XLS)");
        println!("===============================");
        println!();
        for column in Column::ALL {
            println!("{:28} {}", column.header(), column.description());
        }
        println!();
        println!("Column names are matched ignoring case and surrounding spaces.");
        println!("Dates: YYYY-MM-DD, DD/MM/YYYY, DD-MM-YYYY or DD-Mon-YYYY");
        Ok(())
    }
}
