mod migrations;
mod tasks;
