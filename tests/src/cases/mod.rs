cases! {
    udp_simple,
    udp_oversized,

    tcp_simple,
    tcp_refused,

    http_simple,
    http_default_path,
    http_status_error,
    http_timeout,
    http_refused,
    http_redirect,
    http_ignores_proxy,

    end_to_end_fields,
    check_mode,
    invalid_dest
}
