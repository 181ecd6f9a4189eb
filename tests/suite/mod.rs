mod country_source;
mod quiz_round;
