mod conditions_steps;
mod monitor_steps;
