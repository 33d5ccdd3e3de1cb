//! Unit and init-script templates.
//!
//! Rendered with Tera from a [`ServiceDescriptor`]. The systemd unit, procd
//! script and BSD rc script override the init systems' defaults; the SysV
//! script is the generic fallback for plain `/etc/init.d` hosts.

use std::collections::HashMap;

use tera::{Context, Tera, Value};

use crate::service::{ServiceDescriptor, ServiceError};

/// A bundled unit or script template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptTemplate {
    SystemdUnit,
    SysV,
    Procd,
    BsdRc,
}

impl ScriptTemplate {
    pub fn name(&self) -> &'static str {
        match self {
            ScriptTemplate::SystemdUnit => "systemd.service",
            ScriptTemplate::SysV => "sysv.sh",
            ScriptTemplate::Procd => "procd.sh",
            ScriptTemplate::BsdRc => "rc.sh",
        }
    }

    pub fn source(&self) -> &'static str {
        match self {
            ScriptTemplate::SystemdUnit => SYSTEMD_UNIT,
            ScriptTemplate::SysV => SYSV_SCRIPT,
            ScriptTemplate::Procd => PROCD_SCRIPT,
            ScriptTemplate::BsdRc => BSD_RC_SCRIPT,
        }
    }

    /// Render this template for `descriptor`.
    pub fn render(&self, descriptor: &ServiceDescriptor) -> Result<String, ServiceError> {
        let template_error = |e: tera::Error| ServiceError::Template {
            name: self.name(),
            message: error_chain(&e),
        };

        let mut tera = Tera::default();
        tera.register_filter("cmd", cmd_filter);
        tera.register_filter("cmd_escape", cmd_escape_filter);
        tera.register_filter("rc_var", rc_var_filter);
        tera.add_raw_template(self.name(), self.source())
            .map_err(template_error)?;

        let context = Context::from_serialize(descriptor).map_err(template_error)?;
        tera.render(self.name(), &context).map_err(template_error)
    }
}

/// Quote an argument for a shell or `ExecStart=` line when it needs it.
fn cmd_filter(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    let arg = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("cmd filter expects a string"))?;
    if !arg.is_empty() && !arg.contains(|c: char| c.is_whitespace() || c == '"' || c == '\\') {
        return Ok(Value::String(arg.to_string()));
    }
    let escaped = arg.replace('\\', "\\\\").replace('"', "\\\"");
    Ok(Value::String(format!("\"{}\"", escaped)))
}

/// Escape a path for systemd, which splits `ExecStart=` on whitespace.
fn cmd_escape_filter(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    let path = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("cmd_escape filter expects a string"))?;
    Ok(Value::String(path.replace('\\', "\\\\").replace(' ', "\\x20")))
}

/// Turn a service name into an `rc.subr` variable prefix.
fn rc_var_filter(value: &Value, _: &HashMap<String, Value>) -> tera::Result<Value> {
    let name = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("rc_var filter expects a string"))?;
    let var = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    Ok(Value::String(var))
}

fn error_chain(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// Must be started only after the network is online.
const SYSTEMD_UNIT: &str = r#"[Unit]
Description={{ description }}
ConditionFileIsExecutable={{ executable | cmd_escape }}
After=syslog.target network-online.target

[Service]
StartLimitInterval=5
StartLimitBurst=10
ExecStart={{ executable | cmd_escape }}{% for arg in arguments %} {{ arg | cmd }}{% endfor %}
WorkingDirectory={{ working_directory | cmd_escape }}
{% if options.log_output -%}
StandardOutput=file:/var/log/{{ name }}.out
StandardError=file:/var/log/{{ name }}.err
{% endif -%}
Restart=always
RestartSec=10
EnvironmentFile=-/etc/sysconfig/{{ name }}

[Install]
WantedBy=multi-user.target
"#;

const SYSV_SCRIPT: &str = r#"#!/bin/sh
### BEGIN INIT INFO
# Provides:          {{ name }}
# Required-Start:    $local_fs $network $remote_fs $syslog
# Required-Stop:     $local_fs $network $remote_fs $syslog
# Default-Start:     2 3 4 5
# Default-Stop:      0 1 6
# Short-Description: {{ display_name }}
# Description:       {{ description }}
### END INIT INFO

name="{{ name }}"
pid_file="/var/run/$name.pid"
stdout_log="/var/log/$name.log"
stderr_log="/var/log/$name.err"

get_pid() {
    cat "$pid_file"
}

is_running() {
    [ -f "$pid_file" ] && cat /proc/$(get_pid)/stat > /dev/null 2>&1
}

case "$1" in
    start)
        if is_running; then
            echo "Already started"
        else
            echo "Starting $name"
            cd "{{ working_directory }}"
            {{ executable | cmd }}{% for arg in arguments %} {{ arg | cmd }}{% endfor %} >> "$stdout_log" 2>> "$stderr_log" &
            echo $! > "$pid_file"
            if ! is_running; then
                echo "Unable to start, see $stdout_log and $stderr_log"
                exit 1
            fi
        fi
    ;;
    stop)
        if is_running; then
            echo -n "Stopping $name.."
            kill $(get_pid)
            for i in $(seq 1 10)
            do
                if ! is_running; then
                    break
                fi
                echo -n "."
                sleep 1
            done
            echo
            if is_running; then
                echo "Not stopped; may still be shutting down or shutdown may have failed"
                exit 1
            else
                echo "Stopped"
                if [ -f "$pid_file" ]; then
                    rm "$pid_file"
                fi
            fi
        else
            echo "Not running"
        fi
    ;;
    restart)
        $0 stop
        if is_running; then
            echo "Unable to stop, will not attempt to start"
            exit 1
        fi
        $0 start
    ;;
    status)
        if is_running; then
            echo "Running"
        else
            echo "Stopped"
            exit 1
        fi
    ;;
    *)
    echo "Usage: $0 {start|stop|restart|status}"
    exit 1
    ;;
esac
exit 0
"#;

const PROCD_SCRIPT: &str = r#"#!/bin/sh /etc/rc.common

USE_PROCD=1

START=95
STOP=01

name="{{ name }}"
pid_file="/var/run/${name}.pid"

start_service() {
    echo "Starting ${name}"

    procd_open_instance
    procd_set_param command {{ executable | cmd }}{% for arg in arguments %} {{ arg | cmd }}{% endfor %}
    procd_set_param respawn
    procd_set_param stdout 1
    procd_set_param stderr 1
    procd_set_param pidfile ${pid_file}
    procd_close_instance
    echo "${name} has been started"
}

stop_service() {
    echo "Stopping ${name}"
}

EXTRA_COMMANDS="status"
EXTRA_HELP="        status  Print the service status"

get_pid() {
    cat "${pid_file}"
}

is_running() {
    [ -f "${pid_file}" ] && [ -d "/proc/$(get_pid)" ] > /dev/null 2>&1
}

status() {
    if is_running; then
        echo "Running"
    else
        echo "Stopped"
        exit 1
    fi
}
"#;

const BSD_RC_SCRIPT: &str = r#"#!/bin/sh
# PROVIDE: {{ name }}
# REQUIRE: networking
# KEYWORD: shutdown
. /etc/rc.subr
name="{{ name | rc_var }}"
{{ name | rc_var }}_env="IS_DAEMON=1"
{{ name | rc_var }}_user="root"
{{ name | rc_var }}_chdir="{{ working_directory }}"
pidfile="/var/run/${name}.pid"
command="/usr/sbin/daemon"
command_args='-P ${pidfile} -r -f {{ executable | cmd }}{% for arg in arguments %} {{ arg | cmd }}{% endfor %}'
run_rc_command "$1"
"#;
