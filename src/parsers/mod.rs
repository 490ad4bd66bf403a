pub mod report_parser;
